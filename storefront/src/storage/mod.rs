// storefront/src/storage/mod.rs

//! Storage seams consumed by the order lifecycle.
//!
//! Every mutation that guards an invariant is a single atomic operation on the backend:
//! stock decrements only apply when enough stock is left, and status transitions are a
//! compare-and-set on the current status.

pub mod memory;
pub mod postgres;
pub mod seed;

use crate::errors::Result;
use crate::models::{
  DateBounds, OrderFilter, OrderRecord, OrderStatus, Product, SaleRecord, SaleTotals, StatusChange, StatusTotals,
  StockChange, UserSummary,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The product stock ledger.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;

  /// `stock -= quantity`, applied only when `stock >= quantity`.
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockChange>;

  /// `stock += quantity`. Returns `false` when the product no longer exists.
  async fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert(&self, order: &OrderRecord) -> Result<()>;

  async fn find(&self, id: Uuid) -> Result<Option<OrderRecord>>;

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<OrderRecord>>;

  /// Applies `change` only if the order is still in `expected`. `None` means the order is
  /// missing or its status moved on.
  async fn transition(&self, id: Uuid, expected: OrderStatus, change: &StatusChange) -> Result<Option<OrderRecord>>;

  /// Orders matching `filter`, newest first, at most `filter.limit` of them.
  async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>>;

  /// Deletes every id owned by `owner_id` whose status is in `deletable`, or nothing at all.
  /// Returns the number of deleted orders: `ids.len()` or `0`.
  async fn delete_batch(&self, owner_id: Uuid, ids: &[Uuid], deletable: &[OrderStatus]) -> Result<u64>;

  async fn status_totals(&self) -> Result<StatusTotals>;
}

/// Identity lookups supplied by the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
  async fn admin_ids(&self) -> Result<Vec<Uuid>>;

  async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>>;

  async fn summary(&self, id: Uuid) -> Result<Option<UserSummary>> {
    Ok(self.summaries(&[id]).await?.remove(&id))
  }
}

/// The quick-buy sale ledger, read-only.
#[async_trait]
pub trait SaleLedger: Send + Sync {
  /// Sales inside `bounds`, newest first, at most `limit` of them.
  async fn list_sales(&self, bounds: &DateBounds, limit: Option<usize>) -> Result<Vec<SaleRecord>>;

  async fn sale_totals(&self) -> Result<SaleTotals>;
}
