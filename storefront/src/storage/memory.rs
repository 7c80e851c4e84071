// storefront/src/storage/memory.rs

//! In-memory backend. Each guarded operation runs under a single write lock, which gives
//! it the same atomicity as the conditional updates of the Postgres backend.

use super::{OrderStore, ProductCatalog, SaleLedger, UserDirectory};
use crate::errors::{AppError, Result};
use crate::models::{
  DateBounds, OrderFilter, OrderRecord, OrderStatus, Product, Role, SaleRecord, SaleTotals, StatusChange,
  StatusTotals, StockChange, UserSummary,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredUser {
  summary: UserSummary,
  role: Role,
}

#[derive(Default)]
pub struct MemoryStore {
  products: RwLock<HashMap<Uuid, Product>>,
  orders: RwLock<HashMap<Uuid, OrderRecord>>,
  users: RwLock<HashMap<Uuid, StoredUser>>,
  sales: RwLock<Vec<SaleRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn upsert_product(&self, product: Product) {
    self.products.write().insert(product.id, product);
  }

  pub fn remove_product(&self, id: Uuid) -> Option<Product> {
    self.products.write().remove(&id)
  }

  /// Current stock of a product, `None` when unknown.
  pub fn stock_of(&self, id: Uuid) -> Option<i32> {
    self.products.read().get(&id).map(|p| p.stock_quantity)
  }

  pub fn add_user(&self, summary: UserSummary, role: Role) {
    self.users.write().insert(summary.id, StoredUser { summary, role });
  }

  pub fn record_sale(&self, sale: SaleRecord) {
    self.sales.write().push(sale);
  }

  pub fn order_count(&self) -> usize {
    self.orders.read().len()
  }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.products.read().get(&id).cloned())
  }

  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockChange> {
    let mut products = self.products.write();
    let Some(product) = products.get_mut(&id) else {
      return Ok(StockChange::Missing);
    };
    if product.stock_quantity < quantity {
      return Ok(StockChange::Insufficient {
        product_name: product.name.clone(),
        available: product.stock_quantity,
      });
    }
    product.stock_quantity -= quantity;
    product.updated_at = Utc::now();
    Ok(StockChange::Applied {
      remaining: product.stock_quantity,
    })
  }

  async fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<bool> {
    let mut products = self.products.write();
    match products.get_mut(&id) {
      Some(product) => {
        product.stock_quantity = product.stock_quantity.checked_add(quantity).ok_or_else(|| {
          AppError::Internal(format!("Stock of product {} would overflow", product.id))
        })?;
        product.updated_at = Utc::now();
        Ok(true)
      }
      None => Ok(false),
    }
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert(&self, order: &OrderRecord) -> Result<()> {
    self.orders.write().insert(order.id, order.clone());
    Ok(())
  }

  async fn find(&self, id: Uuid) -> Result<Option<OrderRecord>> {
    Ok(self.orders.read().get(&id).cloned())
  }

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<OrderRecord>> {
    let orders = self.orders.read();
    Ok(ids.iter().filter_map(|id| orders.get(id).cloned()).collect())
  }

  async fn transition(&self, id: Uuid, expected: OrderStatus, change: &StatusChange) -> Result<Option<OrderRecord>> {
    let mut orders = self.orders.write();
    match orders.get_mut(&id) {
      Some(order) if order.status == expected => {
        change.apply(order, Utc::now());
        Ok(Some(order.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
    let mut found: Vec<OrderRecord> = self
      .orders
      .read()
      .values()
      .filter(|o| filter.matches(o))
      .cloned()
      .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    if let Some(limit) = filter.limit {
      found.truncate(limit);
    }
    Ok(found)
  }

  async fn delete_batch(&self, owner_id: Uuid, ids: &[Uuid], deletable: &[OrderStatus]) -> Result<u64> {
    let mut orders = self.orders.write();
    let all_eligible = ids.iter().all(|id| {
      orders
        .get(id)
        .map(|o| o.owner_id == owner_id && deletable.contains(&o.status))
        .unwrap_or(false)
    });
    if !all_eligible {
      return Ok(0);
    }
    for id in ids {
      orders.remove(id);
    }
    Ok(ids.len() as u64)
  }

  async fn status_totals(&self) -> Result<StatusTotals> {
    let orders = self.orders.read();
    let mut totals = StatusTotals::default();
    for order in orders.values() {
      totals.add(order.status, 1, order.total_amount_cents);
    }
    Ok(totals)
  }
}

#[async_trait]
impl UserDirectory for MemoryStore {
  async fn admin_ids(&self) -> Result<Vec<Uuid>> {
    let mut ids: Vec<Uuid> = self
      .users
      .read()
      .values()
      .filter(|u| u.role == Role::Admin)
      .map(|u| u.summary.id)
      .collect();
    ids.sort();
    Ok(ids)
  }

  async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>> {
    let users = self.users.read();
    Ok(
      ids
        .iter()
        .filter_map(|id| users.get(id).map(|u| (*id, u.summary.clone())))
        .collect(),
    )
  }
}

#[async_trait]
impl SaleLedger for MemoryStore {
  async fn list_sales(&self, bounds: &DateBounds, limit: Option<usize>) -> Result<Vec<SaleRecord>> {
    let mut found: Vec<SaleRecord> = self
      .sales
      .read()
      .iter()
      .filter(|s| bounds.contains(s.created_at))
      .cloned()
      .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(limit) = limit {
      found.truncate(limit);
    }
    Ok(found)
  }

  async fn sale_totals(&self) -> Result<SaleTotals> {
    let sales = self.sales.read();
    Ok(SaleTotals {
      count: sales.len() as i64,
      revenue_cents: sales.iter().map(|s| s.total_cents).sum(),
    })
  }
}
