// storefront/src/services/order_queries.rs

//! Read side of the order lifecycle: listings, single-order details and admin figures.

use crate::errors::{AppError, Result};
use crate::models::{
  ActivityEntry, Actor, AdminOrderView, LineProductView, OrderDetails, OrderFilter, OrderQuery, OrderRecord,
  OrderStats,
};
use crate::pipelines::common_steps::order_not_found;
use crate::state::AppState;
use std::collections::BTreeSet;
use tracing::{debug, instrument};
use uuid::Uuid;

pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;
pub const MAX_ACTIVITY_LIMIT: usize = 200;

fn require_admin(actor: &Actor) -> Result<()> {
  if actor.is_admin() {
    Ok(())
  } else {
    Err(AppError::Forbidden("Admin access required".to_string()))
  }
}

#[instrument(name = "queries::list_for_owner", skip(state, query), fields(user_id = %actor.user_id))]
pub async fn list_for_owner(state: &AppState, actor: Actor, query: &OrderQuery) -> Result<Vec<OrderRecord>> {
  let filter = query.to_filter(Some(actor.user_id))?;
  let orders = state.orders.list(&filter).await?;
  debug!(count = orders.len(), "Owner orders listed.");
  Ok(orders)
}

#[instrument(name = "queries::list_all", skip(state, query), fields(user_id = %actor.user_id))]
pub async fn list_all(state: &AppState, actor: Actor, query: &OrderQuery) -> Result<Vec<AdminOrderView>> {
  require_admin(&actor)?;
  let filter = query.to_filter(None)?;
  let orders = state.orders.list(&filter).await?;

  let owner_ids: Vec<Uuid> = orders.iter().map(|o| o.owner_id).collect::<BTreeSet<_>>().into_iter().collect();
  let owners = state.users.summaries(&owner_ids).await?;
  Ok(
    orders
      .into_iter()
      .map(|order| AdminOrderView {
        owner: owners.get(&order.owner_id).cloned(),
        order,
      })
      .collect(),
  )
}

/// The order with its owner and line products resolved. Only the owner or an admin may read it.
#[instrument(name = "queries::get_by_id", skip(state), fields(user_id = %actor.user_id))]
pub async fn get_by_id(state: &AppState, actor: Actor, order_id: Uuid) -> Result<OrderDetails> {
  let order = state.orders.find(order_id).await?.ok_or_else(|| order_not_found(order_id))?;
  if order.owner_id != actor.user_id && !actor.is_admin() {
    return Err(AppError::Forbidden("You do not have access to this order".to_string()));
  }

  let owner = state.users.summary(order.owner_id).await?;
  let mut products = Vec::with_capacity(order.line_items.len());
  for line in &order.line_items {
    let name = state.products.get_product(line.product_id).await?.map(|p| p.name);
    products.push(LineProductView {
      product_id: line.product_id,
      name,
      quantity: line.quantity,
      unit_price_cents: line.unit_price_cents,
      subtotal_cents: line.subtotal_cents().unwrap_or(i64::MAX),
    });
  }
  Ok(OrderDetails { order, owner, products })
}

#[instrument(name = "queries::stats", skip(state), fields(user_id = %actor.user_id))]
pub async fn stats(state: &AppState, actor: Actor) -> Result<OrderStats> {
  require_admin(&actor)?;
  let totals = state.orders.status_totals().await?;
  let sales = state.sales.sale_totals().await?;
  Ok(OrderStats::from_totals(&totals, &sales))
}

/// Orders and quick sales merged by timestamp, newest first.
#[instrument(name = "queries::recent_activity", skip(state, query), fields(user_id = %actor.user_id))]
pub async fn recent_activity(state: &AppState, actor: Actor, query: &OrderQuery) -> Result<Vec<ActivityEntry>> {
  require_admin(&actor)?;
  let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT);
  let filter = OrderFilter {
    limit: Some(limit),
    ..query.to_filter(None)?
  };

  let orders = state.orders.list(&filter).await?;
  // Status does not apply to quick sales; they are left out when filtering by it.
  let sales = if filter.status.is_some() {
    Vec::new()
  } else {
    state.sales.list_sales(&filter.dates, Some(limit)).await?
  };

  let mut entries: Vec<ActivityEntry> = orders
    .iter()
    .map(ActivityEntry::from)
    .chain(sales.iter().map(ActivityEntry::from))
    .collect();
  entries.sort_by(|a, b| b.at().cmp(&a.at()));
  entries.truncate(limit);
  Ok(entries)
}
