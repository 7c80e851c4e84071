// storefront/src/pipelines/approve_order.rs

use crate::errors::{AppError, Result};
use crate::models::{Notification, OrderStatus, PaymentStatus, StatusChange, StockChange};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::ApproveOrderCtxData;
use chrono::Utc;
use orderflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{info, instrument, warn};

pub const PIPELINE_NAME: &str = "approve_order";

/// Approval takes stock line by line with guarded decrements, then flips the status with a
/// compare-and-set. Any failure after the first decrement, including a lost status race,
/// gives every applied decrement back.
pub fn register_approve_order_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<ApproveOrderCtxData, AppError>::new(
    PIPELINE_NAME,
    &[
      ("authorize_admin", false, None),
      ("load_pending_order", false, None),
      ("decrement_line_stock", false, None),
      ("commit_approval", false, None),
      ("notify_owner_approved", true, None),
    ],
  );

  p.on_root("authorize_admin", common_steps::authorize_admin::<ApproveOrderCtxData>);
  p.on_root("load_pending_order", common_steps::load_pending_order::<ApproveOrderCtxData>);
  p.on_root("decrement_line_stock", decrement_line_stock);
  p.compensate_root("decrement_line_stock", restore_line_stock);
  p.on_root("commit_approval", commit_approval);

  p.on_root("notify_owner_approved", |ctx_data: ContextData<ApproveOrderCtxData>| async move {
    let (state, order) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.approved_order.clone())
    };
    if let Some(order) = order {
      common_steps::notify(&state, Notification::order_approved(&order)).await;
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  flows.register_pipeline(p);
}

#[instrument(name = "approve::decrement_line_stock", skip(ctx_data), err)]
async fn decrement_line_stock(ctx_data: ContextData<ApproveOrderCtxData>) -> Result<PipelineControl> {
  let order = common_steps::loaded_order(&ctx_data)?;
  let state = ctx_data.read().app_state.clone();

  for line in &order.line_items {
    match state.products.decrement_stock(line.product_id, line.quantity).await? {
      StockChange::Applied { remaining } => {
        ctx_data.write().applied_decrements.push((line.product_id, line.quantity));
        info!(product_id = %line.product_id, quantity = line.quantity, remaining, "Stock taken for approval.");
      }
      StockChange::Insufficient {
        product_name,
        available,
      } => {
        warn!(order_id = %order.id, product_id = %line.product_id, available, requested = line.quantity, "Approval blocked by stock.");
        return Err(AppError::InsufficientStock {
          product_name,
          available,
          requested: line.quantity,
        });
      }
      StockChange::Missing => {
        return Err(AppError::NotFound(format!(
          "Product {} in order {} no longer exists",
          line.product_id, order.id
        )));
      }
    }
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "approve::restore_line_stock", skip(ctx_data), err)]
async fn restore_line_stock(ctx_data: ContextData<ApproveOrderCtxData>) -> Result<()> {
  let (state, applied) = {
    let mut guard = ctx_data.write();
    let applied = std::mem::take(&mut guard.applied_decrements);
    (guard.app_state.clone(), applied)
  };

  let mut failures = Vec::new();
  for (product_id, quantity) in applied.into_iter().rev() {
    match state.products.increment_stock(product_id, quantity).await {
      Ok(true) => info!(%product_id, quantity, "Stock returned after failed approval."),
      Ok(false) => warn!(%product_id, quantity, "Product vanished before its stock could be returned."),
      Err(e) => {
        warn!(%product_id, quantity, error = %e, "Failed to return stock.");
        failures.push(product_id);
      }
    }
  }
  if failures.is_empty() {
    Ok(())
  } else {
    Err(AppError::Internal(format!(
      "Could not return stock for products {:?}",
      failures
    )))
  }
}

async fn commit_approval(ctx_data: ContextData<ApproveOrderCtxData>) -> Result<PipelineControl> {
  let order = common_steps::loaded_order(&ctx_data)?;
  let (state, actor, admin_notes) = {
    let guard = ctx_data.read();
    (guard.app_state.clone(), guard.actor, guard.admin_notes.clone())
  };

  let payment_status = if order.payment_method.is_prepaid() {
    PaymentStatus::Verified
  } else {
    PaymentStatus::Pending
  };
  let change = StatusChange::to(OrderStatus::Approved)
    .payment(payment_status)
    .notes(admin_notes)
    .approved(actor.user_id, Utc::now());

  let Some(approved) = state.orders.transition(order.id, OrderStatus::Pending, &change).await? else {
    return Err(common_steps::lost_transition(&state, order.id, OrderStatus::Pending, "approved").await);
  };
  info!(order_id = %approved.id, approved_by = %actor.user_id, "Order approved.");
  ctx_data.write().approved_order = Some(approved);
  Ok(PipelineControl::Continue)
}
