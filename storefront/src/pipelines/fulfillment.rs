// storefront/src/pipelines/fulfillment.rs

use crate::errors::AppError;
use crate::models::{Notification, OrderStatus, PaymentStatus, StatusChange};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::AdvanceFulfillmentCtxData;
use orderflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::info;

pub const PIPELINE_NAME: &str = "advance_fulfillment";

/// `approved -> processing -> shipped -> completed`, one step per call.
pub fn register_fulfillment_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<AdvanceFulfillmentCtxData, AppError>::new(
    PIPELINE_NAME,
    &[
      ("authorize_admin", false, None),
      ("load_order", false, None),
      ("validate_fulfillment_step", false, None),
      ("commit_fulfillment", false, None),
      ("notify_owner_status", true, None),
    ],
  );

  p.on_root("authorize_admin", common_steps::authorize_admin::<AdvanceFulfillmentCtxData>);
  p.on_root("load_order", common_steps::load_order::<AdvanceFulfillmentCtxData>);

  p.on_root("validate_fulfillment_step", |ctx_data: ContextData<AdvanceFulfillmentCtxData>| async move {
    let order = common_steps::loaded_order(&ctx_data)?;
    let target = ctx_data.read().target;
    if order.status.next_fulfillment() != Some(target) {
      let expected = match order.status.next_fulfillment() {
        Some(next) => format!("the next allowed status is '{}'", next),
        None => "it is not in fulfillment".to_string(),
      };
      return Err(AppError::InvalidTransition(format!(
        "Order cannot move from '{}' to '{}': {}",
        order.status, target, expected
      )));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("commit_fulfillment", |ctx_data: ContextData<AdvanceFulfillmentCtxData>| async move {
    let order = common_steps::loaded_order(&ctx_data)?;
    let (state, target) = ctx_data.with(|d| (d.app_state.clone(), d.target));

    let mut change = StatusChange::to(target);
    if target == OrderStatus::Completed {
      change = change.payment(PaymentStatus::Paid);
    }
    let Some(updated) = state.orders.transition(order.id, order.status, &change).await? else {
      return Err(common_steps::lost_transition(&state, order.id, order.status, "moved along fulfillment").await);
    };
    info!(order_id = %updated.id, from = %order.status, to = %updated.status, "Fulfillment advanced.");
    ctx_data.write().updated_order = Some(updated);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("notify_owner_status", |ctx_data: ContextData<AdvanceFulfillmentCtxData>| async move {
    let (state, order) = ctx_data.with(|d| (d.app_state.clone(), d.updated_order.clone()));
    if let Some(order) = order {
      common_steps::notify(&state, Notification::order_status_updated(&order)).await;
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  flows.register_pipeline(p);
}
