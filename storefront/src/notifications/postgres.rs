// storefront/src/notifications/postgres.rs

use super::NotificationSink;
use crate::errors::Result;
use crate::models::Notification;
use async_trait::async_trait;
use sqlx::PgPool;

/// Persists in-app messages in the `notifications` table.
#[derive(Clone)]
pub struct PgNotificationSink {
  pool: PgPool,
}

impl PgNotificationSink {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl NotificationSink for PgNotificationSink {
  async fn send(&self, notification: Notification) -> Result<()> {
    sqlx::query(
      "INSERT INTO notifications (id, user_id, order_id, kind, message, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(notification.order_id)
    .bind(notification.kind)
    .bind(&notification.message)
    .bind(notification.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}
