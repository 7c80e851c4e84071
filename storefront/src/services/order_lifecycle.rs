// storefront/src/services/order_lifecycle.rs

//! Entry points for every order mutation. Each one seeds a context, runs the registered
//! pipeline and reads the outcome back out of the context.

use crate::errors::{AppError, Result};
use crate::models::{Actor, OrderDraft, OrderRecord, OrderStatus};
use crate::pipelines::contexts::{
  AdvanceFulfillmentCtxData, ApproveOrderCtxData, CancelOrderCtxData, CreateOrderCtxData, DeleteOrdersCtxData,
  RejectOrderCtxData,
};
use crate::state::AppState;
use orderflow::{ContextData, PipelineResult};
use tracing::{instrument, warn};
use uuid::Uuid;

async fn run_to_completion<T: Send + Sync + 'static>(state: &AppState, ctx_data: ContextData<T>) -> Result<()> {
  match state.flows.run(ctx_data).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => {
      warn!(context = std::any::type_name::<T>(), "Lifecycle pipeline stopped early.");
      Err(AppError::PipelineHalted)
    }
  }
}

fn outcome(order: Option<OrderRecord>, operation: &str) -> Result<OrderRecord> {
  order.ok_or_else(|| AppError::Internal(format!("{} completed without producing an order", operation)))
}

#[instrument(name = "lifecycle::create_order", skip(state, draft), fields(user_id = %actor.user_id, lines = draft.line_items.len()))]
pub async fn create_order(state: &AppState, actor: Actor, draft: OrderDraft) -> Result<OrderRecord> {
  let ctx_data = ContextData::new(CreateOrderCtxData::new(state.clone(), actor, draft));
  run_to_completion(state, ctx_data.clone()).await?;
  let created = ctx_data.read().created_order.clone();
  outcome(created, "create_order")
}

#[instrument(name = "lifecycle::approve_order", skip(state, admin_notes), fields(user_id = %actor.user_id))]
pub async fn approve_order(
  state: &AppState,
  actor: Actor,
  order_id: Uuid,
  admin_notes: Option<String>,
) -> Result<OrderRecord> {
  let ctx_data = ContextData::new(ApproveOrderCtxData::new(state.clone(), actor, order_id, admin_notes));
  run_to_completion(state, ctx_data.clone()).await?;
  let approved = ctx_data.read().approved_order.clone();
  outcome(approved, "approve_order")
}

#[instrument(name = "lifecycle::reject_order", skip(state, rejection_reason, admin_notes), fields(user_id = %actor.user_id))]
pub async fn reject_order(
  state: &AppState,
  actor: Actor,
  order_id: Uuid,
  rejection_reason: Option<String>,
  admin_notes: Option<String>,
) -> Result<OrderRecord> {
  let ctx_data = ContextData::new(RejectOrderCtxData::new(
    state.clone(),
    actor,
    order_id,
    rejection_reason,
    admin_notes,
  ));
  run_to_completion(state, ctx_data.clone()).await?;
  let rejected = ctx_data.read().rejected_order.clone();
  outcome(rejected, "reject_order")
}

#[instrument(name = "lifecycle::cancel_order", skip(state), fields(user_id = %actor.user_id))]
pub async fn cancel_order(state: &AppState, actor: Actor, order_id: Uuid) -> Result<OrderRecord> {
  let ctx_data = ContextData::new(CancelOrderCtxData::new(state.clone(), actor, order_id));
  run_to_completion(state, ctx_data.clone()).await?;
  let cancelled = ctx_data.read().cancelled_order.clone();
  outcome(cancelled, "cancel_order")
}

#[instrument(name = "lifecycle::delete_order", skip(state), fields(user_id = %actor.user_id))]
pub async fn delete_order(state: &AppState, actor: Actor, order_id: Uuid) -> Result<()> {
  delete_orders(state, actor, vec![order_id]).await.map(|_| ())
}

/// All-or-nothing; returns the number of deleted orders.
#[instrument(name = "lifecycle::delete_orders", skip(state, order_ids), fields(user_id = %actor.user_id, count = order_ids.len()))]
pub async fn delete_orders(state: &AppState, actor: Actor, order_ids: Vec<Uuid>) -> Result<u64> {
  let ctx_data = ContextData::new(DeleteOrdersCtxData::new(state.clone(), actor, order_ids));
  run_to_completion(state, ctx_data.clone()).await?;
  let deleted = ctx_data.read().deleted_count;
  Ok(deleted)
}

#[instrument(name = "lifecycle::advance_fulfillment", skip(state), fields(user_id = %actor.user_id))]
pub async fn advance_fulfillment(
  state: &AppState,
  actor: Actor,
  order_id: Uuid,
  target: OrderStatus,
) -> Result<OrderRecord> {
  let ctx_data = ContextData::new(AdvanceFulfillmentCtxData::new(state.clone(), actor, order_id, target));
  run_to_completion(state, ctx_data.clone()).await?;
  let updated = ctx_data.read().updated_order.clone();
  outcome(updated, "advance_fulfillment")
}
