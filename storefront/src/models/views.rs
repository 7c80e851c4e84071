// storefront/src/models/views.rs

//! Read-side shapes returned by the query service.

use crate::models::order::{OrderRecord, OrderStatus};
use crate::models::sale::{SaleRecord, SaleTotals};
use crate::models::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// An order enriched with its owner's identity (admin listings).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderView {
  #[serde(flatten)]
  pub order: OrderRecord,
  pub owner: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProductView {
  pub product_id: Uuid,
  /// `None` when the product has since been removed from the catalog.
  pub name: Option<String>,
  pub quantity: i32,
  pub unit_price_cents: i64,
  pub subtotal_cents: i64,
}

/// A single order with product and owner details resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
  #[serde(flatten)]
  pub order: OrderRecord,
  pub owner: Option<UserSummary>,
  pub products: Vec<LineProductView>,
}

/// Per-status counts and revenue of approved orders, as aggregated by the order store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTotals {
  pub counts: BTreeMap<OrderStatus, i64>,
  pub approved_revenue_cents: i64,
  /// Revenue of orders in processing, shipped or completed.
  pub fulfilled_revenue_cents: i64,
}

impl StatusTotals {
  pub fn add(&mut self, status: OrderStatus, count: i64, revenue_cents: i64) {
    *self.counts.entry(status).or_insert(0) += count;
    if status == OrderStatus::Approved {
      self.approved_revenue_cents += revenue_cents;
    } else if status.is_in_fulfillment() {
      self.fulfilled_revenue_cents += revenue_cents;
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
  pub total_orders: i64,
  pub per_status_counts: BTreeMap<String, i64>,
  /// Approved orders only.
  pub total_revenue_cents: i64,
  /// Orders past approval (processing, shipped, completed), reported apart from `total_revenue_cents`.
  pub fulfilled_revenue_cents: i64,
  pub quick_sale_count: i64,
  pub quick_sale_revenue_cents: i64,
}

impl OrderStats {
  pub fn from_totals(totals: &StatusTotals, sales: &SaleTotals) -> Self {
    let per_status_counts: BTreeMap<String, i64> = OrderStatus::ALL
      .into_iter()
      .map(|s| (s.as_str().to_string(), totals.counts.get(&s).copied().unwrap_or(0)))
      .collect();
    Self {
      total_orders: per_status_counts.values().sum(),
      per_status_counts,
      total_revenue_cents: totals.approved_revenue_cents,
      fulfilled_revenue_cents: totals.fulfilled_revenue_cents,
      quick_sale_count: sales.count,
      quick_sale_revenue_cents: sales.revenue_cents,
    }
  }
}

/// One entry of the admin activity feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ActivityEntry {
  #[serde(rename_all = "camelCase")]
  Order {
    order_id: Uuid,
    owner_id: Uuid,
    status: OrderStatus,
    total_amount_cents: i64,
    at: DateTime<Utc>,
  },
  #[serde(rename_all = "camelCase")]
  QuickSale {
    sale_id: Uuid,
    buyer_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    total_cents: i64,
    at: DateTime<Utc>,
  },
}

impl ActivityEntry {
  pub fn at(&self) -> DateTime<Utc> {
    match self {
      ActivityEntry::Order { at, .. } | ActivityEntry::QuickSale { at, .. } => *at,
    }
  }
}

impl From<&OrderRecord> for ActivityEntry {
  fn from(order: &OrderRecord) -> Self {
    ActivityEntry::Order {
      order_id: order.id,
      owner_id: order.owner_id,
      status: order.status,
      total_amount_cents: order.total_amount_cents,
      at: order.created_at,
    }
  }
}

impl From<&SaleRecord> for ActivityEntry {
  fn from(sale: &SaleRecord) -> Self {
    ActivityEntry::QuickSale {
      sale_id: sale.id,
      buyer_id: sale.buyer_id,
      product_id: sale.product_id,
      quantity: sale.quantity,
      total_cents: sale.total_cents,
      at: sale.created_at,
    }
  }
}
