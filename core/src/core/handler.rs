// orderflow/src/core/handler.rs

//! Boxed handler types stored by a `Pipeline<TData, Err>`.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by stored handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A step handler: receives a clone of the run's `ContextData<TData>` and decides whether
/// the pipeline continues.
///
/// Handlers must copy what they need out of a lock guard and drop it before awaiting.
pub type Handler<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> BoxFuture<Result<PipelineControl, Err>> + Send + Sync>;

/// Undo logic for a step, run while unwinding after a later (or the same) step failed.
///
/// Compensators read whatever the forward handlers recorded in the context (for example
/// the stock movements already applied) and reverse exactly that.
pub type Compensator<TData, Err> = Box<dyn Fn(ContextData<TData>) -> BoxFuture<Result<(), Err>> + Send + Sync>;
