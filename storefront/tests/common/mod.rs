// tests/common/mod.rs
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront::config::AppConfig;
use storefront::models::{
  Actor, LineItem, LineItemRequest, OrderDraft, OrderRecord, OrderStatus, PaymentDetails, PaymentMethod,
  PaymentStatus, Product, Role, SaleRecord, ShippingAddress, ShippingAddressInput, StockChange, UserSummary,
};
use storefront::models::order::total_cents;
use storefront::notifications::MemoryNotificationSink;
use storefront::state::AppState;
use storefront::errors::{AppError, Result};
use storefront::storage::{MemoryStore, OrderStore, ProductCatalog};
use tracing::Level;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub notifier: Arc<MemoryNotificationSink>,
  pub admin: Actor,
  pub second_admin: Actor,
  pub customer: Actor,
  pub other_customer: Actor,
}

pub fn test_app() -> TestApp {
  test_app_with(AppConfig::default())
}

pub fn test_app_with(config: AppConfig) -> TestApp {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let notifier = Arc::new(MemoryNotificationSink::new());
  let state = AppState::in_memory(config, store.clone(), notifier.clone());

  let admin = Actor::admin(Uuid::new_v4());
  let second_admin = Actor::admin(Uuid::new_v4());
  let customer = Actor::customer(Uuid::new_v4());
  let other_customer = Actor::customer(Uuid::new_v4());
  for (actor, name) in [
    (admin, "Ada Admin"),
    (second_admin, "Sam Admin"),
    (customer, "Carla Customer"),
    (other_customer, "Omar Other"),
  ] {
    store.add_user(
      UserSummary {
        id: actor.user_id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
      },
      actor.role,
    );
  }

  TestApp {
    state,
    store,
    notifier,
    admin,
    second_admin,
    customer,
    other_customer,
  }
}

impl TestApp {
  pub fn add_product(&self, name: &str, price_cents: i64, stock: i32) -> Uuid {
    let product = Product::new(name, price_cents, stock);
    let id = product.id;
    self.store.upsert_product(product);
    id
  }

  pub fn add_unapproved_product(&self, name: &str, price_cents: i64, stock: i32) -> Uuid {
    let mut product = Product::new(name, price_cents, stock);
    product.approved = false;
    let id = product.id;
    self.store.upsert_product(product);
    id
  }

  /// The same state with a different product catalog.
  pub fn state_with_catalog(&self, catalog: Arc<dyn ProductCatalog>) -> AppState {
    let mut state = self.state.clone();
    state.products = catalog;
    state
  }

  pub fn stock(&self, product_id: Uuid) -> i32 {
    self.store.stock_of(product_id).unwrap_or(-1)
  }

  /// Stores an order directly, bypassing the lifecycle.
  pub async fn insert_order(
    &self,
    owner: Actor,
    status: OrderStatus,
    lines: Vec<LineItem>,
    created_at: DateTime<Utc>,
  ) -> OrderRecord {
    let order = OrderRecord {
      id: Uuid::new_v4(),
      owner_id: owner.user_id,
      total_amount_cents: total_cents(&lines).unwrap(),
      line_items: lines,
      status,
      shipping_address: ShippingAddress {
        full_name: "Carla Customer".to_string(),
        phone: "+8801700000000".to_string(),
        street: "12 Lake Road".to_string(),
        city: "Dhaka".to_string(),
        zip: "1205".to_string(),
        state: None,
        country: "Bangladesh".to_string(),
      },
      payment_method: PaymentMethod::CashOnDelivery,
      payment_details: PaymentDetails::default(),
      payment_status: PaymentStatus::Pending,
      admin_notes: None,
      rejection_reason: None,
      approved_by: None,
      approved_at: None,
      created_at,
      updated_at: created_at,
    };
    self.store.insert(&order).await.unwrap();
    order
  }

  pub fn record_sale(&self, buyer: Actor, product_id: Uuid, quantity: i32, total_cents: i64, at: DateTime<Utc>) {
    self.store.record_sale(SaleRecord {
      id: Uuid::new_v4(),
      buyer_id: buyer.user_id,
      product_id,
      quantity,
      total_cents,
      created_at: at,
    });
  }
}

/// Catalog over a memory store whose `increment_stock` fails on one chosen call.
pub struct FlakyRestockCatalog {
  inner: Arc<MemoryStore>,
  fail_on_call: usize,
  calls: AtomicUsize,
}

impl FlakyRestockCatalog {
  /// `fail_on_call` counts from 1.
  pub fn new(inner: Arc<MemoryStore>, fail_on_call: usize) -> Self {
    Self {
      inner,
      fail_on_call,
      calls: AtomicUsize::new(0),
    }
  }
}

#[async_trait]
impl ProductCatalog for FlakyRestockCatalog {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.inner.get_product(id).await
  }

  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockChange> {
    self.inner.decrement_stock(id, quantity).await
  }

  async fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<bool> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call == self.fail_on_call {
      return Err(AppError::Internal(format!("stock ledger unavailable for {}", id)));
    }
    self.inner.increment_stock(id, quantity).await
  }
}

pub fn address() -> ShippingAddressInput {
  ShippingAddressInput {
    full_name: Some("Carla Customer".to_string()),
    phone: Some("+8801700000000".to_string()),
    street: Some("12 Lake Road".to_string()),
    city: Some("Dhaka".to_string()),
    zip: Some("1205".to_string()),
    state: None,
    country: None,
  }
}

pub fn lines(items: &[(Uuid, i32)]) -> Vec<LineItemRequest> {
  items
    .iter()
    .map(|(product_id, quantity)| LineItemRequest {
      product_id: *product_id,
      quantity: *quantity,
      unit_price_cents: None,
    })
    .collect()
}

pub fn cod_draft(items: &[(Uuid, i32)]) -> OrderDraft {
  OrderDraft {
    line_items: lines(items),
    shipping_address: address(),
    payment_method: Some(PaymentMethod::CashOnDelivery),
    payment_details: PaymentDetails::default(),
  }
}

pub fn card_draft(items: &[(Uuid, i32)], transaction_id: Option<&str>) -> OrderDraft {
  OrderDraft {
    line_items: lines(items),
    shipping_address: address(),
    payment_method: Some(PaymentMethod::Card),
    payment_details: PaymentDetails {
      transaction_id: transaction_id.map(str::to_string),
      ..Default::default()
    },
  }
}

pub fn line(product_id: Uuid, quantity: i32, unit_price_cents: i64) -> LineItem {
  LineItem {
    product_id,
    quantity,
    unit_price_cents,
  }
}

pub fn role_of(actor: &Actor) -> &'static str {
  match actor.role {
    Role::Admin => "admin",
    Role::Customer => "customer",
  }
}
