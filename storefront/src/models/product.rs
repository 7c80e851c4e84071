// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog entry as seen by the order lifecycle: price, available stock and the approval flag.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub stock_quantity: i32,
  pub approved: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn new(name: &str, price_cents: i64, stock_quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.to_string(),
      price_cents,
      stock_quantity,
      approved: true,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Outcome of a guarded stock decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockChange {
  Applied { remaining: i32 },
  Insufficient { product_name: String, available: i32 },
  Missing,
}
