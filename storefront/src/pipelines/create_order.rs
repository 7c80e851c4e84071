// storefront/src/pipelines/create_order.rs

use crate::errors::{AppError, Result};
use crate::models::order::{format_cents, total_cents, MAX_UNIT_PRICE_CENTS};
use crate::models::{LineItem, Notification, OrderRecord, OrderStatus, PaymentStatus};
use crate::pipelines::common_steps;
use crate::pipelines::contexts::CreateOrderCtxData;
use chrono::Utc;
use orderflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const PIPELINE_NAME: &str = "create_order";

/// Order creation checks availability but leaves stock untouched; approval is the
/// reservation point.
pub fn register_create_order_pipeline(flows: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<CreateOrderCtxData, AppError>::new(
    PIPELINE_NAME,
    &[
      ("verify_owner", false, None),
      ("validate_order_request", false, None),
      ("load_line_products", false, None),
      ("price_line_items", false, None),
      ("persist_order", false, None),
      ("notify_owner_order_placed", true, None),
      ("notify_admins_new_order", true, None),
    ],
  );

  p.on_root("verify_owner", |ctx_data: ContextData<CreateOrderCtxData>| async move {
    let (state, owner_id) = ctx_data.with(|d| (d.app_state.clone(), d.actor.user_id));
    if state.users.summary(owner_id).await?.is_none() {
      warn!(%owner_id, "Order placed by an identity unknown to the user directory.");
      return Err(AppError::Auth(format!("Unknown user {}", owner_id)));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p.on_root("validate_order_request", validate_order_request);
  p.on_root("load_line_products", load_line_products);

  p.on_root("price_line_items", |ctx_data: ContextData<CreateOrderCtxData>| async move {
    let priced: Vec<LineItem> = {
      let guard = ctx_data.read();
      guard
        .draft
        .line_items
        .iter()
        .map(|line| LineItem {
          product_id: line.product_id,
          quantity: line.quantity,
          unit_price_cents: line
            .unit_price_cents
            .or_else(|| guard.products.get(&line.product_id).map(|p| p.price_cents))
            .unwrap_or_default(),
        })
        .collect()
    };
    let total = total_cents(&priced)
      .ok_or_else(|| AppError::Validation("Order total is too large".to_string()))?;
    debug!(lines = priced.len(), total_cents = total, "Line items priced.");
    ctx_data.update(|d| {
      d.line_items = priced;
      d.total_amount_cents = total;
    });
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("persist_order", |ctx_data: ContextData<CreateOrderCtxData>| async move {
    let (state, order) = {
      let guard = ctx_data.read();
      let shipping_address = guard
        .shipping_address
        .clone()
        .ok_or_else(|| AppError::Internal("Shipping address was not validated".to_string()))?;
      let payment_method = guard
        .draft
        .payment_method
        .ok_or_else(|| AppError::Internal("Payment method was not validated".to_string()))?;
      let now = Utc::now();
      let order = OrderRecord {
        id: Uuid::new_v4(),
        owner_id: guard.actor.user_id,
        total_amount_cents: guard.total_amount_cents,
        line_items: guard.line_items.clone(),
        status: OrderStatus::Pending,
        shipping_address,
        payment_method,
        payment_details: guard.draft.payment_details.clone(),
        payment_status: PaymentStatus::Pending,
        admin_notes: None,
        rejection_reason: None,
        approved_by: None,
        approved_at: None,
        created_at: now,
        updated_at: now,
      };
      (guard.app_state.clone(), order)
    };

    state.orders.insert(&order).await?;
    info!(order_id = %order.id, owner_id = %order.owner_id, total_cents = order.total_amount_cents, "Order placed.");
    ctx_data.write().created_order = Some(order);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("notify_owner_order_placed", |ctx_data: ContextData<CreateOrderCtxData>| async move {
    let (state, order) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.created_order.clone())
    };
    if let Some(order) = order {
      common_steps::notify(&state, Notification::order_placed(&order)).await;
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("notify_admins_new_order", |ctx_data: ContextData<CreateOrderCtxData>| async move {
    let (state, order) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.created_order.clone())
    };
    if let Some(order) = order {
      common_steps::notify_admins(&state, &order).await;
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  flows.register_pipeline(p);
}

/// Request-shape checks, in order, failing on the first violation.
async fn validate_order_request(ctx_data: ContextData<CreateOrderCtxData>) -> Result<PipelineControl> {
  let (draft, default_country) = {
    let guard = ctx_data.read();
    (guard.draft.clone(), guard.app_state.config.default_country.clone())
  };

  if draft.line_items.is_empty() {
    return Err(AppError::Validation("Order must contain at least one line item".to_string()));
  }
  if let Some(bad) = draft.line_items.iter().find(|l| l.quantity < 1) {
    return Err(AppError::Validation(format!(
      "Quantity for product {} must be at least 1",
      bad.product_id
    )));
  }
  if let Some(bad) = draft.line_items.iter().find(|l| l.unit_price_cents.is_some_and(|p| p < 0)) {
    return Err(AppError::Validation(format!(
      "Unit price for product {} must not be negative",
      bad.product_id
    )));
  }
  if let Some(bad) = draft
    .line_items
    .iter()
    .find(|l| l.unit_price_cents.is_some_and(|p| p > MAX_UNIT_PRICE_CENTS))
  {
    return Err(AppError::Validation(format!(
      "Unit price for product {} must not exceed {}",
      bad.product_id,
      format_cents(MAX_UNIT_PRICE_CENTS)
    )));
  }

  let shipping_address = draft.shipping_address.complete(&default_country).map_err(|missing| {
    AppError::Validation(format!("Shipping address is missing: {}", missing.join(", ")))
  })?;

  let Some(payment_method) = draft.payment_method else {
    return Err(AppError::Validation("Payment method is required".to_string()));
  };
  if payment_method.is_prepaid() && !draft.payment_details.has_transaction_id() {
    return Err(AppError::Validation(format!(
      "Transaction ID is required for {} payments",
      payment_method.label()
    )));
  }

  ctx_data.write().shipping_address = Some(shipping_address);
  Ok(PipelineControl::Continue)
}

/// Every product must exist, be approved and have enough stock for all lines that
/// reference it in this order.
async fn load_line_products(ctx_data: ContextData<CreateOrderCtxData>) -> Result<PipelineControl> {
  let (state, lines) = {
    let guard = ctx_data.read();
    (guard.app_state.clone(), guard.draft.line_items.clone())
  };

  let mut products = HashMap::new();
  let mut requested: HashMap<Uuid, i32> = HashMap::new();
  for line in &lines {
    if !products.contains_key(&line.product_id) {
      let product = state
        .products
        .get_product(line.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", line.product_id)))?;
      products.insert(line.product_id, product);
    }
    let Some(product) = products.get(&line.product_id) else {
      continue;
    };
    if !product.approved {
      return Err(AppError::Unavailable(format!(
        "Product '{}' is not available for sale",
        product.name
      )));
    }

    let wanted = requested.entry(line.product_id).or_insert(0);
    *wanted = wanted.saturating_add(line.quantity);
    if product.stock_quantity < *wanted {
      warn!(product_id = %product.id, available = product.stock_quantity, requested = *wanted, "Order exceeds stock.");
      return Err(AppError::InsufficientStock {
        product_name: product.name.clone(),
        available: product.stock_quantity,
        requested: *wanted,
      });
    }
  }

  ctx_data.write().products = products;
  Ok(PipelineControl::Continue)
}
