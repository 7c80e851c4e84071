// storefront/src/pipelines/cancel_order.rs

use crate::errors::{AppError, Result};
use crate::models::{Notification, OrderStatus, StatusChange, StockChange};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::CancelOrderCtxData;
use orderflow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const PIPELINE_NAME: &str = "cancel_order";

/// Cancellation claims the order first (`pending -> cancelled`), so the restock below runs
/// at most once however many cancels race.
pub fn register_cancel_order_pipeline(flows: &FlowRegistry<AppError>) {
  let restock_disabled: SkipCondition<CancelOrderCtxData> =
    Arc::new(|ctx_data: ContextData<CancelOrderCtxData>| {
      ctx_data.with(|d| !d.app_state.config.restock_on_pending_cancel)
    });
  let notify_disabled: SkipCondition<CancelOrderCtxData> =
    Arc::new(|ctx_data: ContextData<CancelOrderCtxData>| {
      ctx_data.with(|d| !d.app_state.config.notify_on_cancel)
    });

  let mut p = Pipeline::<CancelOrderCtxData, AppError>::new(
    PIPELINE_NAME,
    &[
      ("load_order", false, None),
      ("authorize_owner", false, None),
      ("ensure_pending", false, None),
      ("claim_cancellation", false, None),
      ("restock_lines", false, Some(restock_disabled)),
      ("notify_owner_cancelled", true, Some(notify_disabled)),
    ],
  );

  p.on_root("load_order", common_steps::load_order::<CancelOrderCtxData>);

  p.on_root("authorize_owner", |ctx_data: ContextData<CancelOrderCtxData>| async move {
    let order = common_steps::loaded_order(&ctx_data)?;
    let actor = ctx_data.read().actor;
    if order.owner_id != actor.user_id {
      warn!(order_id = %order.id, user_id = %actor.user_id, "Cancel attempted by non-owner.");
      return Err(AppError::Forbidden("You can only cancel your own orders".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("ensure_pending", |ctx_data: ContextData<CancelOrderCtxData>| async move {
    let order = common_steps::loaded_order(&ctx_data)?;
    if order.status != OrderStatus::Pending {
      return Err(common_steps::not_pending(&order, "cancelled"));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("claim_cancellation", claim_cancellation);
  p.compensate_root("claim_cancellation", release_cancellation);
  p.on_root("restock_lines", restock_lines);
  p.compensate_root("restock_lines", take_back_restock);

  p.on_root("notify_owner_cancelled", |ctx_data: ContextData<CancelOrderCtxData>| async move {
    let (state, order) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.cancelled_order.clone())
    };
    if let Some(order) = order {
      common_steps::notify(&state, Notification::order_cancelled(&order)).await;
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  flows.register_pipeline(p);
}

async fn claim_cancellation(ctx_data: ContextData<CancelOrderCtxData>) -> Result<PipelineControl> {
  let (state, order_id) = ctx_data.with(|d| (d.app_state.clone(), d.order_id));

  let change = StatusChange::to(OrderStatus::Cancelled);
  let Some(cancelled) = state.orders.transition(order_id, OrderStatus::Pending, &change).await? else {
    return Err(common_steps::lost_transition(&state, order_id, OrderStatus::Pending, "cancelled").await);
  };
  info!(%order_id, "Order cancelled.");
  ctx_data.write().cancelled_order = Some(cancelled);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cancel::release_cancellation", skip(ctx_data), err)]
async fn release_cancellation(ctx_data: ContextData<CancelOrderCtxData>) -> Result<()> {
  let (state, claimed) = {
    let mut guard = ctx_data.write();
    (guard.app_state.clone(), guard.cancelled_order.take())
  };
  let Some(order) = claimed else {
    return Ok(());
  };
  let back = StatusChange::to(OrderStatus::Pending);
  match state.orders.transition(order.id, OrderStatus::Cancelled, &back).await? {
    Some(_) => {
      info!(order_id = %order.id, "Cancellation rolled back; order is pending again.");
      Ok(())
    }
    None => Err(AppError::Internal(format!(
      "Order {} left 'cancelled' before its cancellation could be rolled back",
      order.id
    ))),
  }
}

#[instrument(name = "cancel::restock_lines", skip(ctx_data), err)]
async fn restock_lines(ctx_data: ContextData<CancelOrderCtxData>) -> Result<PipelineControl> {
  let order = common_steps::loaded_order(&ctx_data)?;
  let state = ctx_data.read().app_state.clone();

  for line in &order.line_items {
    if state.products.increment_stock(line.product_id, line.quantity).await? {
      ctx_data.write().restocked.push((line.product_id, line.quantity));
    } else {
      warn!(order_id = %order.id, product_id = %line.product_id, "Product no longer exists; nothing to restock.");
    }
  }
  info!(order_id = %order.id, lines = order.line_items.len(), "Stock restored for cancelled order.");
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cancel::take_back_restock", skip(ctx_data), err)]
async fn take_back_restock(ctx_data: ContextData<CancelOrderCtxData>) -> Result<()> {
  let (state, restocked) = {
    let mut guard = ctx_data.write();
    let restocked = std::mem::take(&mut guard.restocked);
    (guard.app_state.clone(), restocked)
  };

  for (product_id, quantity) in restocked.into_iter().rev() {
    match state.products.decrement_stock(product_id, quantity).await? {
      StockChange::Applied { .. } => {}
      StockChange::Insufficient { available, .. } => {
        warn!(%product_id, quantity, available, "Restored stock was already consumed; leaving it in place.");
      }
      StockChange::Missing => warn!(%product_id, "Product vanished while undoing a restock."),
    }
  }
  Ok(())
}
