// storefront/src/pipelines/delete_orders.rs

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::pipelines::contexts::DeleteOrdersCtxData;
use orderflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

pub const PIPELINE_NAME: &str = "delete_orders";

fn id_list(ids: &[Uuid]) -> String {
  ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ")
}

/// Serves both single and bulk deletion. Every check covers the whole batch before
/// anything is removed, and the store deletes all ids or none.
pub fn register_delete_orders_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<DeleteOrdersCtxData, AppError>::new(
    PIPELINE_NAME,
    &[
      ("validate_ids", false, None),
      ("load_orders", false, None),
      ("check_ownership", false, None),
      ("check_deletable", false, None),
      ("delete_batch", false, None),
    ],
  );

  p.on_root("validate_ids", |ctx_data: ContextData<DeleteOrdersCtxData>| async move {
    ctx_data.update(|d| {
      if d.order_ids.is_empty() {
        return Err(AppError::Validation("orderIds must contain at least one id".to_string()));
      }
      let mut seen = HashSet::new();
      d.order_ids.retain(|id| seen.insert(*id));
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("load_orders", |ctx_data: ContextData<DeleteOrdersCtxData>| async move {
    let (state, ids) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.order_ids.clone())
    };
    let orders = state.orders.find_many(&ids).await?;
    let found: HashSet<Uuid> = orders.iter().map(|o| o.id).collect();
    let missing: Vec<Uuid> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    if !missing.is_empty() {
      return Err(AppError::NotFound(format!("Orders not found: {}", id_list(&missing))));
    }
    ctx_data.write().orders = orders;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("check_ownership", |ctx_data: ContextData<DeleteOrdersCtxData>| async move {
    let foreign: Vec<Uuid> = ctx_data.with(|d| {
      d.orders
        .iter()
        .filter(|o| o.owner_id != d.actor.user_id)
        .map(|o| o.id)
        .collect()
    });
    if !foreign.is_empty() {
      warn!(orders = %id_list(&foreign), "Delete attempted on orders owned by someone else.");
      return Err(AppError::Forbidden(format!(
        "You can only delete your own orders; not yours: {}",
        id_list(&foreign)
      )));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("check_deletable", |ctx_data: ContextData<DeleteOrdersCtxData>| async move {
    let blocked: Vec<String> = ctx_data.with(|d| {
      d.orders
        .iter()
        .filter(|o| !o.status.is_deletable())
        .map(|o| format!("{} ({})", o.id, o.status))
        .collect()
    });
    if !blocked.is_empty() {
      return Err(AppError::InvalidTransition(format!(
        "Only {} orders can be deleted; not deletable: {}",
        OrderStatus::DELETABLE.map(|s| s.as_str()).join(", "),
        blocked.join(", ")
      )));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("delete_batch", |ctx_data: ContextData<DeleteOrdersCtxData>| async move {
    let (state, owner_id, ids) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.actor.user_id, guard.order_ids.clone())
    };
    let deleted = state
      .orders
      .delete_batch(owner_id, &ids, &OrderStatus::DELETABLE)
      .await?;
    if deleted != ids.len() as u64 {
      return Err(AppError::InvalidTransition(
        "Orders changed while being deleted; nothing was deleted".to_string(),
      ));
    }
    info!(%owner_id, deleted, "Orders deleted.");
    ctx_data.write().deleted_count = deleted;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  flows.register_pipeline(p);
}
