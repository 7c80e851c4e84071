// storefront/src/notifications/memory.rs

use super::NotificationSink;
use crate::errors::{AppError, Result};
use crate::models::Notification;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Keeps in-app messages in memory. Can be told to fail every delivery.
#[derive(Default)]
pub struct MemoryNotificationSink {
  sent: Mutex<Vec<Notification>>,
  failing: AtomicBool,
}

impl MemoryNotificationSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  pub fn sent(&self) -> Vec<Notification> {
    self.sent.lock().clone()
  }

  pub fn sent_to(&self, user_id: Uuid) -> Vec<Notification> {
    self.sent.lock().iter().filter(|n| n.user_id == user_id).cloned().collect()
  }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
  async fn send(&self, notification: Notification) -> Result<()> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(AppError::Internal("notification store unavailable".to_string()));
    }
    self.sent.lock().push(notification);
    Ok(())
  }
}
