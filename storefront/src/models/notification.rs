// storefront/src/models/notification.rs

use crate::models::order::{format_cents, OrderRecord, OrderStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Type as SqlxType;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "notification_kind_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  OrderPlaced,
  NewOrder,
  OrderApproved,
  OrderRejected,
  OrderCancelled,
  OrderStatusUpdated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id: Uuid,
  pub user_id: Uuid,
  pub order_id: Option<Uuid>,
  pub kind: NotificationKind,
  pub message: String,
  pub created_at: DateTime<Utc>,
}

impl Notification {
  pub fn new(user_id: Uuid, order_id: Option<Uuid>, kind: NotificationKind, message: String) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      order_id,
      kind,
      message,
      created_at: Utc::now(),
    }
  }

  pub fn order_placed(order: &OrderRecord) -> Self {
    Self::new(
      order.owner_id,
      Some(order.id),
      NotificationKind::OrderPlaced,
      format!(
        "Your order #{} has been placed and is awaiting approval. Total: {}.",
        order.id,
        format_cents(order.total_amount_cents)
      ),
    )
  }

  pub fn new_order_for_admin(admin_id: Uuid, order: &OrderRecord) -> Self {
    Self::new(
      admin_id,
      Some(order.id),
      NotificationKind::NewOrder,
      format!(
        "New order #{} received. Payment method: {}. Total: {}.",
        order.id,
        order.payment_method.label(),
        format_cents(order.total_amount_cents)
      ),
    )
  }

  pub fn order_approved(order: &OrderRecord) -> Self {
    Self::new(
      order.owner_id,
      Some(order.id),
      NotificationKind::OrderApproved,
      format!("Your order #{} has been approved.", order.id),
    )
  }

  pub fn order_rejected(order: &OrderRecord) -> Self {
    let reason = order.rejection_reason.as_deref().unwrap_or("no reason given");
    Self::new(
      order.owner_id,
      Some(order.id),
      NotificationKind::OrderRejected,
      format!("Your order #{} has been rejected. Reason: {}", order.id, reason),
    )
  }

  pub fn order_cancelled(order: &OrderRecord) -> Self {
    Self::new(
      order.owner_id,
      Some(order.id),
      NotificationKind::OrderCancelled,
      format!("Your order #{} has been cancelled.", order.id),
    )
  }

  pub fn order_status_updated(order: &OrderRecord) -> Self {
    let message = match order.status {
      OrderStatus::Completed => format!("Your order #{} has been delivered. Thank you!", order.id),
      status => format!("Your order #{} is now {}.", order.id, status),
    };
    Self::new(order.owner_id, Some(order.id), NotificationKind::OrderStatusUpdated, message)
  }
}
