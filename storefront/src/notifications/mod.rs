// storefront/src/notifications/mod.rs

//! Lifecycle notification sinks.
//!
//! Delivery is best-effort: callers go through [`deliver`], which logs and swallows
//! failures so a committed order transition is never affected.

pub mod email;
pub mod memory;
pub mod postgres;

use crate::errors::Result;
use crate::models::Notification;
use async_trait::async_trait;
use tracing::{info, warn};

pub use email::EmailNotificationSink;
pub use memory::MemoryNotificationSink;
pub use postgres::PgNotificationSink;

#[async_trait]
pub trait NotificationSink: Send + Sync {
  async fn send(&self, notification: Notification) -> Result<()>;
}

/// Sends `notification`, logging instead of returning any failure.
pub async fn deliver(sink: &dyn NotificationSink, notification: Notification) {
  let (user_id, kind) = (notification.user_id, notification.kind);
  if let Err(e) = sink.send(notification).await {
    warn!(%user_id, ?kind, error = %e, "Notification delivery failed; continuing.");
  }
}

/// Writes notifications to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
  async fn send(&self, notification: Notification) -> Result<()> {
    info!(
      user_id = %notification.user_id,
      order_id = ?notification.order_id,
      kind = ?notification.kind,
      "Notification: {}",
      notification.message
    );
    Ok(())
  }
}
