// storefront/src/pipelines/reject_order.rs

use crate::errors::AppError;
use crate::models::{Notification, OrderStatus, PaymentStatus, StatusChange};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::RejectOrderCtxData;
use orderflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::info;

pub const PIPELINE_NAME: &str = "reject_order";

pub fn register_reject_order_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<RejectOrderCtxData, AppError>::new(
    PIPELINE_NAME,
    &[
      ("authorize_admin", false, None),
      ("validate_rejection", false, None),
      ("load_pending_order", false, None),
      ("commit_rejection", false, None),
      ("notify_owner_rejected", true, None),
    ],
  );

  p.on_root("authorize_admin", common_steps::authorize_admin::<RejectOrderCtxData>);

  p.on_root("validate_rejection", |ctx_data: ContextData<RejectOrderCtxData>| async move {
    let reason = ctx_data
      .read()
      .rejection_reason
      .as_deref()
      .map(str::trim)
      .filter(|r| !r.is_empty())
      .map(str::to_string);
    let Some(reason) = reason else {
      return Err(AppError::Validation("Rejection reason is required".to_string()));
    };
    ctx_data.write().rejection_reason = Some(reason);
    Ok(PipelineControl::Continue)
  });

  p.on_root("load_pending_order", common_steps::load_pending_order::<RejectOrderCtxData>);

  p.on_root("commit_rejection", |ctx_data: ContextData<RejectOrderCtxData>| async move {
    let order = common_steps::loaded_order(&ctx_data)?;
    let (state, reason, admin_notes) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.rejection_reason.clone(), guard.admin_notes.clone())
    };
    let change = StatusChange::to(OrderStatus::Rejected)
      .payment(PaymentStatus::Failed)
      .reason(reason.unwrap_or_default())
      .notes(admin_notes);

    let Some(rejected) = state.orders.transition(order.id, OrderStatus::Pending, &change).await? else {
      return Err(common_steps::lost_transition(&state, order.id, OrderStatus::Pending, "rejected").await);
    };
    info!(order_id = %rejected.id, "Order rejected.");
    ctx_data.write().rejected_order = Some(rejected);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("notify_owner_rejected", |ctx_data: ContextData<RejectOrderCtxData>| async move {
    let (state, order) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.rejected_order.clone())
    };
    if let Some(order) = order {
      common_steps::notify(&state, Notification::order_rejected(&order)).await;
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  flows.register_pipeline(p);
}
