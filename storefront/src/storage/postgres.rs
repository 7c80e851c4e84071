// storefront/src/storage/postgres.rs

//! Postgres backend using runtime `sqlx` queries against the schema in `migrations/`.

use super::{OrderStore, ProductCatalog, SaleLedger, UserDirectory};
use crate::errors::{AppError, Result};
use crate::models::{
  DateBounds, LineItem, OrderFilter, OrderRecord, OrderStatus, PaymentDetails, PaymentMethod, PaymentStatus, Product,
  SaleRecord, SaleTotals, ShippingAddress, StatusChange, StatusTotals, StockChange, UserSummary,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::{error, instrument};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, owner_id, line_items, total_amount_cents, status, shipping_address, payment_method, \
   payment_details, payment_status, admin_notes, rejection_reason, approved_by, approved_at, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, name, price_cents, stock_quantity, approved, created_at, updated_at";

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  owner_id: Uuid,
  line_items: Json<Vec<LineItem>>,
  total_amount_cents: i64,
  status: OrderStatus,
  shipping_address: Json<ShippingAddress>,
  payment_method: PaymentMethod,
  payment_details: Json<PaymentDetails>,
  payment_status: PaymentStatus,
  admin_notes: Option<String>,
  rejection_reason: Option<String>,
  approved_by: Option<Uuid>,
  approved_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderRecord {
  fn from(row: OrderRow) -> Self {
    OrderRecord {
      id: row.id,
      owner_id: row.owner_id,
      line_items: row.line_items.0,
      total_amount_cents: row.total_amount_cents,
      status: row.status,
      shipping_address: row.shipping_address.0,
      payment_method: row.payment_method,
      payment_details: row.payment_details.0,
      payment_status: row.payment_status,
      admin_notes: row.admin_notes,
      rejection_reason: row.rejection_reason,
      approved_by: row.approved_by,
      approved_at: row.approved_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

/// Orders reference `users`; a foreign key failure there means the acting identity is
/// missing from the user directory.
fn unknown_user(err: sqlx::Error, user_id: Option<Uuid>) -> AppError {
  match (err.as_database_error(), user_id) {
    (Some(db), Some(user_id)) if db.is_foreign_key_violation() => {
      AppError::Auth(format!("Unknown user {}", user_id))
    }
    _ => AppError::Sqlx(err),
  }
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await
      .map_err(|e| {
        error!("Failed to connect to the database: {}", e);
        e
      })?;
    tracing::info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  pub async fn run_migrations(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    tracing::info!("Database migrations applied.");
    Ok(())
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl ProductCatalog for PgStore {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  #[instrument(name = "pg::decrement_stock", skip(self))]
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockChange> {
    let remaining: Option<i32> = sqlx::query_scalar(
      "UPDATE products SET stock_quantity = stock_quantity - $2, updated_at = NOW() \
       WHERE id = $1 AND stock_quantity >= $2 RETURNING stock_quantity",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;

    if let Some(remaining) = remaining {
      return Ok(StockChange::Applied { remaining });
    }

    let current: Option<(String, i32)> = sqlx::query_as("SELECT name, stock_quantity FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(match current {
      Some((product_name, available)) => StockChange::Insufficient {
        product_name,
        available,
      },
      None => StockChange::Missing,
    })
  }

  #[instrument(name = "pg::increment_stock", skip(self))]
  async fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<bool> {
    let result =
      sqlx::query("UPDATE products SET stock_quantity = stock_quantity + $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
    Ok(result.rows_affected() == 1)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn insert(&self, order: &OrderRecord) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
      ORDER_COLUMNS
    ))
    .bind(order.id)
    .bind(order.owner_id)
    .bind(Json(&order.line_items))
    .bind(order.total_amount_cents)
    .bind(order.status)
    .bind(Json(&order.shipping_address))
    .bind(order.payment_method)
    .bind(Json(&order.payment_details))
    .bind(order.payment_status)
    .bind(&order.admin_notes)
    .bind(&order.rejection_reason)
    .bind(order.approved_by)
    .bind(order.approved_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| unknown_user(e, Some(order.owner_id)))?;
    Ok(())
  }

  async fn find(&self, id: Uuid) -> Result<Option<OrderRecord>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(OrderRecord::from))
  }

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<OrderRecord>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!("SELECT {} FROM orders WHERE id = ANY($1)", ORDER_COLUMNS))
      .bind(ids.to_vec())
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(OrderRecord::from).collect())
  }

  #[instrument(name = "pg::transition_order", skip(self, change), fields(to = %change.status))]
  async fn transition(&self, id: Uuid, expected: OrderStatus, change: &StatusChange) -> Result<Option<OrderRecord>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
      "UPDATE orders SET status = $3, \
         payment_status = COALESCE($4, payment_status), \
         admin_notes = COALESCE($5, admin_notes), \
         rejection_reason = COALESCE($6, rejection_reason), \
         approved_by = COALESCE($7, approved_by), \
         approved_at = COALESCE($8, approved_at), \
         updated_at = NOW() \
       WHERE id = $1 AND status = $2 \
       RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(expected)
    .bind(change.status)
    .bind(change.payment_status)
    .bind(&change.admin_notes)
    .bind(&change.rejection_reason)
    .bind(change.approved_by)
    .bind(change.approved_at)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| unknown_user(e, change.approved_by))?;
    Ok(row.map(OrderRecord::from))
  }

  async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!("SELECT {} FROM orders WHERE TRUE", ORDER_COLUMNS));
    if let Some(owner_id) = filter.owner_id {
      qb.push(" AND owner_id = ").push_bind(owner_id);
    }
    if let Some(status) = filter.status {
      qb.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.dates.from {
      qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(until) = filter.dates.until {
      qb.push(" AND created_at < ").push_bind(until);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = filter.limit {
      qb.push(" LIMIT ").push_bind(limit as i64);
    }

    let rows = qb.build_query_as::<OrderRow>().fetch_all(&self.pool).await?;
    Ok(rows.into_iter().map(OrderRecord::from).collect())
  }

  #[instrument(name = "pg::delete_orders", skip(self, ids, deletable), fields(count = ids.len()))]
  async fn delete_batch(&self, owner_id: Uuid, ids: &[Uuid], deletable: &[OrderStatus]) -> Result<u64> {
    let statuses: Vec<String> = deletable.iter().map(|s| s.as_str().to_string()).collect();
    let mut tx = self.pool.begin().await?;
    let result = sqlx::query("DELETE FROM orders WHERE id = ANY($1) AND owner_id = $2 AND status::text = ANY($3)")
      .bind(ids.to_vec())
      .bind(owner_id)
      .bind(statuses)
      .execute(&mut *tx)
      .await?;

    if result.rows_affected() != ids.len() as u64 {
      tx.rollback().await?;
      return Ok(0);
    }
    tx.commit().await?;
    Ok(result.rows_affected())
  }

  async fn status_totals(&self) -> Result<StatusTotals> {
    let rows: Vec<(OrderStatus, i64, i64)> = sqlx::query_as(
      "SELECT status, COUNT(*)::BIGINT, COALESCE(SUM(total_amount_cents), 0)::BIGINT FROM orders GROUP BY status",
    )
    .fetch_all(&self.pool)
    .await?;

    let mut totals = StatusTotals::default();
    for (status, count, revenue) in rows {
      totals.add(status, count, revenue);
    }
    Ok(totals)
  }
}

#[async_trait]
impl UserDirectory for PgStore {
  async fn admin_ids(&self) -> Result<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE role = 'admin' ORDER BY id")
      .fetch_all(&self.pool)
      .await?;
    Ok(ids)
  }

  async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>> {
    let rows = sqlx::query_as::<_, UserSummary>("SELECT id, name, email FROM users WHERE id = ANY($1)")
      .bind(ids.to_vec())
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
  }
}

#[async_trait]
impl SaleLedger for PgStore {
  async fn list_sales(&self, bounds: &DateBounds, limit: Option<usize>) -> Result<Vec<SaleRecord>> {
    let sales = sqlx::query_as::<_, SaleRecord>(
      "SELECT id, buyer_id, product_id, quantity, total_cents, created_at FROM sales \
       WHERE ($1::timestamptz IS NULL OR created_at >= $1) AND ($2::timestamptz IS NULL OR created_at < $2) \
       ORDER BY created_at DESC \
       LIMIT $3",
    )
    .bind(bounds.from)
    .bind(bounds.until)
    .bind(limit.map(|l| l as i64))
    .fetch_all(&self.pool)
    .await?;
    Ok(sales)
  }

  async fn sale_totals(&self) -> Result<SaleTotals> {
    let (count, revenue_cents): (i64, i64) =
      sqlx::query_as("SELECT COUNT(*)::BIGINT, COALESCE(SUM(total_cents), 0)::BIGINT FROM sales")
        .fetch_one(&self.pool)
        .await?;
    Ok(SaleTotals { count, revenue_cents })
  }
}
