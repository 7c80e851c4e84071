// storefront/src/pipelines/common_steps.rs

//! Steps shared by several lifecycle pipelines, plus notification helpers.

use crate::errors::{AppError, Result};
use crate::models::{Notification, OrderRecord, OrderStatus};
use crate::notifications;
use crate::pipelines::contexts::OrderActionCtx;
use crate::state::AppState;
use orderflow::{ContextData, PipelineControl};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub fn order_not_found(order_id: Uuid) -> AppError {
  AppError::NotFound(format!("Order {} not found", order_id))
}

/// The error for an order that is no longer (or never was) `pending`.
pub fn not_pending(order: &OrderRecord, action: &str) -> AppError {
  AppError::InvalidTransition(format!(
    "Order cannot be {}: current status is '{}'",
    action, order.status
  ))
}

/// Explains why a compare-and-set expecting `expected` matched nothing.
pub async fn lost_transition(state: &AppState, order_id: Uuid, expected: OrderStatus, action: &str) -> AppError {
  match state.orders.find(order_id).await {
    Ok(Some(order)) if order.status != expected => not_pending(&order, action),
    Ok(Some(order)) => AppError::Internal(format!(
      "Order {} is '{}' but its transition did not apply",
      order.id, order.status
    )),
    Ok(None) => order_not_found(order_id),
    Err(e) => e,
  }
}

#[instrument(name = "common_step::authorize_admin", skip(ctx_data), err)]
pub async fn authorize_admin<T: OrderActionCtx>(ctx_data: ContextData<T>) -> Result<PipelineControl> {
  let actor = ctx_data.read().actor();
  if !actor.is_admin() {
    warn!(user_id = %actor.user_id, "Non-admin attempted an admin order action.");
    return Err(AppError::Forbidden("Admin access required".to_string()));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "common_step::load_order", skip(ctx_data), err)]
pub async fn load_order<T: OrderActionCtx>(ctx_data: ContextData<T>) -> Result<PipelineControl> {
  let (state, order_id) = {
    let guard = ctx_data.read();
    (guard.app_state().clone(), guard.order_id())
  };
  let order = state.orders.find(order_id).await?.ok_or_else(|| order_not_found(order_id))?;
  debug!(%order_id, status = %order.status, "Order loaded.");
  ctx_data.write().set_loaded_order(order);
  Ok(PipelineControl::Continue)
}

/// Loads the order and fails unless it is still `pending`.
#[instrument(name = "common_step::load_pending_order", skip(ctx_data), err)]
pub async fn load_pending_order<T: OrderActionCtx>(ctx_data: ContextData<T>) -> Result<PipelineControl> {
  let (state, order_id, action) = {
    let guard = ctx_data.read();
    (guard.app_state().clone(), guard.order_id(), guard.action())
  };
  let order = state.orders.find(order_id).await?.ok_or_else(|| order_not_found(order_id))?;
  if order.status != OrderStatus::Pending {
    return Err(not_pending(&order, action));
  }
  ctx_data.write().set_loaded_order(order);
  Ok(PipelineControl::Continue)
}

/// Reads the order stored by a previous loading step.
pub fn loaded_order<T: OrderActionCtx>(ctx_data: &ContextData<T>) -> Result<OrderRecord> {
  let loaded = ctx_data.read().loaded_order().cloned();
  loaded.ok_or_else(|| AppError::Internal("Order was not loaded before use".to_string()))
}

pub async fn notify(state: &AppState, notification: Notification) {
  notifications::deliver(state.notifier.as_ref(), notification).await;
}

/// Fans a new-order message out to every admin. Directory failures are logged only.
pub async fn notify_admins(state: &AppState, order: &OrderRecord) {
  let admin_ids = match state.users.admin_ids().await {
    Ok(ids) => ids,
    Err(e) => {
      warn!(order_id = %order.id, error = %e, "Could not list admins; skipping new-order notifications.");
      return;
    }
  };
  for admin_id in admin_ids {
    notify(state, Notification::new_order_for_admin(admin_id, order)).await;
  }
}
