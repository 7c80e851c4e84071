// storefront/src/lib.rs

//! Order lifecycle and inventory reservation service.
//!
//! Orders are created `pending`, and stock is only taken when an admin approves them.
//! Every lifecycle operation runs as an `orderflow` pipeline over pluggable storage.

pub mod config;
pub mod errors;
pub mod models;
pub mod notifications;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod storage;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
