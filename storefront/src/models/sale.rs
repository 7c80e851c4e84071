// storefront/src/models/sale.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the quick-buy sale ledger. Read-only from the order side.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
  pub id: Uuid,
  pub buyer_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub total_cents: i64,
  pub created_at: DateTime<Utc>,
}

/// Count and revenue of the whole quick-sale ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleTotals {
  pub count: i64,
  pub revenue_cents: i64,
}
