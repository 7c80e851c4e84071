// src/lib.rs

//! orderflow: asynchronous step pipelines with saga-style compensation.
//!
//! A pipeline is an ordered list of named steps sharing a `ContextData<TData>`:
//!  - Each step carries `before`/`on`/`after` async handlers.
//!  - Handlers may stop the run early with `PipelineControl::Stop`.
//!  - Steps may be optional, or skipped by a predicate over the context.
//!  - Compensators registered on a step run in reverse order when a later handler fails.
//!  - `FlowRegistry` dispatches to the pipeline registered for a context type.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::{BoxFuture, Compensator, Handler};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
