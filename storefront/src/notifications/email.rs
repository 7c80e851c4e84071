// storefront/src/notifications/email.rs

use super::NotificationSink;
use crate::errors::{AppError, Result};
use crate::models::{Notification, NotificationKind};
use crate::services::email_mock;
use crate::storage::UserDirectory;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Emails each notification to the recipient's address through the mock mailer.
pub struct EmailNotificationSink {
  users: Arc<dyn UserDirectory>,
  sender: String,
}

impl EmailNotificationSink {
  pub fn new(users: Arc<dyn UserDirectory>, sender: String) -> Self {
    Self { users, sender }
  }
}

fn subject_for(kind: NotificationKind) -> &'static str {
  match kind {
    NotificationKind::OrderPlaced => "Your order has been placed",
    NotificationKind::NewOrder => "New order received",
    NotificationKind::OrderApproved => "Your order has been approved",
    NotificationKind::OrderRejected => "Your order has been rejected",
    NotificationKind::OrderCancelled => "Your order has been cancelled",
    NotificationKind::OrderStatusUpdated => "Your order status has changed",
  }
}

#[async_trait]
impl NotificationSink for EmailNotificationSink {
  #[instrument(name = "notify::email", skip(self, notification), fields(user_id = %notification.user_id))]
  async fn send(&self, notification: Notification) -> Result<()> {
    let recipient = self
      .users
      .summary(notification.user_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("No email address for user {}", notification.user_id)))?;

    email_mock::send_mock_email(
      &recipient.email,
      &self.sender,
      subject_for(notification.kind),
      &format!("<p>Hi {},</p><p>{}</p>", recipient.name, notification.message),
    )
    .await?;
    Ok(())
  }
}
