// storefront/src/services/email_mock.rs

//! Stand-in mailer used by the email notification channel.

use crate::errors::{AppError, Result};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SentEmail {
  pub to: String,
  pub subject: String,
  pub message_id: String,
}

pub async fn send_mock_email(to: &str, from: &str, subject: &str, html_body: &str) -> Result<SentEmail> {
  info!(%to, %from, %subject, body_len = html_body.len(), "Simulating email delivery.");
  tokio::time::sleep(Duration::from_millis(5)).await;

  if to.trim().is_empty() || !to.contains('@') {
    warn!(%to, "Mock mailer refused an invalid recipient.");
    return Err(AppError::Internal(format!("Invalid email recipient '{}'", to)));
  }

  let message_id = format!("mock_email_{}", uuid::Uuid::new_v4().simple());
  info!(%message_id, "Mock email sent.");
  Ok(SentEmail {
    to: to.to_string(),
    subject: subject.to_string(),
    message_id,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn rejects_recipients_without_an_address() {
    assert!(send_mock_email("", "noreply@example.com", "Hi", "<p>x</p>").await.is_err());
    let sent = send_mock_email("a@b.test", "noreply@example.com", "Hi", "<p>x</p>").await.unwrap();
    assert_eq!(sent.to, "a@b.test");
    assert!(sent.message_id.starts_with("mock_email_"));
  }
}
