// storefront/src/pipelines/mod.rs

//! One `orderflow` pipeline per order lifecycle operation.

use crate::errors::AppError;
use orderflow::FlowRegistry;

pub mod common_steps;
pub mod contexts;

pub mod approve_order;
pub mod cancel_order;
pub mod create_order;
pub mod delete_orders;
pub mod fulfillment;
pub mod reject_order;

/// Registers every lifecycle pipeline. Called once per `AppState`.
pub fn register_all_pipelines(flows: &FlowRegistry<AppError>) {
  create_order::register_create_order_pipeline(flows);
  approve_order::register_approve_order_pipeline(flows);
  reject_order::register_reject_order_pipeline(flows);
  cancel_order::register_cancel_order_pipeline(flows);
  delete_orders::register_delete_orders_pipeline(flows);
  fulfillment::register_fulfillment_pipeline(flows);
  tracing::debug!("Lifecycle pipelines registered.");
}
