// storefront/src/storage/seed.rs

//! Demo data for the in-memory backend.

use super::MemoryStore;
use crate::models::{Product, Role, SaleRecord, UserSummary};
use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

pub struct SeededIds {
  pub admin_id: Uuid,
  pub customer_id: Uuid,
  pub product_ids: Vec<Uuid>,
}

pub fn seed_demo_data(store: &MemoryStore) -> SeededIds {
  let admin = UserSummary {
    id: Uuid::new_v4(),
    name: "Store Admin".to_string(),
    email: "admin@example.com".to_string(),
  };
  let customer = UserSummary {
    id: Uuid::new_v4(),
    name: "Demo Customer".to_string(),
    email: "customer@example.com".to_string(),
  };
  let (admin_id, customer_id) = (admin.id, customer.id);
  store.add_user(admin, Role::Admin);
  store.add_user(customer, Role::Customer);

  let mut hidden = Product::new("Prototype Speaker", 899_00, 2);
  hidden.approved = false;
  let products = vec![
    Product::new("Handwoven Jute Bag", 12_50, 40),
    Product::new("Clay Water Jug", 8_75, 5),
    Product::new("Nakshi Kantha Quilt", 145_00, 1),
    hidden,
  ];
  let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
  for product in products {
    store.upsert_product(product);
  }

  store.record_sale(SaleRecord {
    id: Uuid::new_v4(),
    buyer_id: customer_id,
    product_id: product_ids[0],
    quantity: 2,
    total_cents: 25_00,
    created_at: Utc::now() - Duration::days(1),
  });

  info!(%admin_id, %customer_id, products = ?product_ids, "Seeded demo data.");
  SeededIds {
    admin_id,
    customer_id,
    product_ids,
  }
}
