// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}': expected 'postgres' or 'memory'",
        other
      ))),
    }
  }
}

/// Where lifecycle notifications go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
  /// In-app messages persisted next to the orders.
  Database,
  Email,
  Log,
}

impl FromStr for NotificationChannel {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "database" | "db" => Ok(NotificationChannel::Database),
      "email" => Ok(NotificationChannel::Email),
      "log" => Ok(NotificationChannel::Log),
      other => Err(AppError::Config(format!(
        "Invalid NOTIFICATION_CHANNEL '{}': expected 'database', 'email' or 'log'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!(
        "Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub storage_backend: StorageBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_demo_data: bool,

  pub notification_channel: NotificationChannel,
  pub mock_email_sender: String,

  /// Applied when a shipping address omits the country.
  pub default_country: String,
  /// Restore line quantities when a pending order is cancelled.
  pub restock_on_pending_cancel: bool,
  pub notify_on_cancel: bool,

  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      storage_backend: StorageBackend::Memory,
      database_url: None,
      database_max_connections: 10,
      run_migrations: true,
      seed_demo_data: false,
      notification_channel: NotificationChannel::Database,
      mock_email_sender: "noreply@example.com".to_string(),
      default_country: "Bangladesh".to_string(),
      restock_on_pending_cancel: true,
      notify_on_cancel: false,
      log_format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(get_env: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = match get_env("SERVER_PORT") {
      Some(raw) => raw
        .trim()
        .parse::<u16>()
        .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
      None => defaults.server_port,
    };

    let storage_backend = match get_env("STORAGE_BACKEND") {
      Some(raw) => raw.parse()?,
      None => StorageBackend::Postgres,
    };
    let database_url = get_env("DATABASE_URL").filter(|url| !url.trim().is_empty());
    if storage_backend == StorageBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORAGE_BACKEND=postgres)".to_string(),
      ));
    }
    let database_max_connections = match get_env("DATABASE_MAX_CONNECTIONS") {
      Some(raw) => raw
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS value: '{}'", raw)))?,
      None => defaults.database_max_connections,
    };

    let run_migrations = parse_flag(&get_env, "RUN_MIGRATIONS", defaults.run_migrations)?;
    let seed_demo_data = parse_flag(&get_env, "SEED_DEMO_DATA", defaults.seed_demo_data)?;

    let notification_channel = match get_env("NOTIFICATION_CHANNEL") {
      Some(raw) => raw.parse()?,
      None => defaults.notification_channel,
    };
    let mock_email_sender = get_env("MOCK_EMAIL_SENDER").unwrap_or(defaults.mock_email_sender);

    let default_country = get_env("DEFAULT_COUNTRY")
      .map(|c| c.trim().to_string())
      .filter(|c| !c.is_empty())
      .unwrap_or(defaults.default_country);
    let restock_on_pending_cancel = parse_flag(
      &get_env,
      "RESTOCK_ON_PENDING_CANCEL",
      defaults.restock_on_pending_cancel,
    )?;
    let notify_on_cancel = parse_flag(&get_env, "NOTIFY_ON_CANCEL", defaults.notify_on_cancel)?;

    let log_format = match get_env("LOG_FORMAT") {
      Some(raw) => raw.parse()?,
      None => defaults.log_format,
    };

    tracing::info!(
      ?storage_backend,
      ?notification_channel,
      restock_on_pending_cancel,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      database_max_connections,
      run_migrations,
      seed_demo_data,
      notification_channel,
      mock_email_sender,
      default_country,
      restock_on_pending_cancel,
      notify_on_cancel,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_flag(get_env: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> Result<bool> {
  let Some(raw) = get_env(name) else {
    return Ok(default);
  };
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" => Ok(false),
    _ => Err(AppError::Config(format!("Invalid {} value: '{}'", name, raw))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn postgres_backend_requires_database_url() {
    let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn memory_backend_uses_defaults() {
    let cfg = AppConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "memory")])).unwrap();
    assert_eq!(cfg.storage_backend, StorageBackend::Memory);
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.default_country, "Bangladesh");
    assert!(cfg.restock_on_pending_cancel);
    assert!(!cfg.notify_on_cancel);
    assert_eq!(cfg.notification_channel, NotificationChannel::Database);
  }

  #[test]
  fn flags_and_enums_are_parsed() {
    let cfg = AppConfig::from_lookup(lookup(&[
      ("STORAGE_BACKEND", "postgres"),
      ("DATABASE_URL", "postgres://localhost/store"),
      ("RESTOCK_ON_PENDING_CANCEL", "no"),
      ("NOTIFY_ON_CANCEL", "1"),
      ("NOTIFICATION_CHANNEL", "email"),
      ("LOG_FORMAT", "json"),
      ("SERVER_PORT", "9090"),
    ]))
    .unwrap();
    assert!(!cfg.restock_on_pending_cancel);
    assert!(cfg.notify_on_cancel);
    assert_eq!(cfg.notification_channel, NotificationChannel::Email);
    assert_eq!(cfg.log_format, LogFormat::Json);
    assert_eq!(cfg.bind_address(), "127.0.0.1:9090");
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for pairs in [
      vec![("STORAGE_BACKEND", "memory"), ("SERVER_PORT", "eighty")],
      vec![("STORAGE_BACKEND", "mongo")],
      vec![("STORAGE_BACKEND", "memory"), ("SEED_DEMO_DATA", "maybe")],
      vec![("STORAGE_BACKEND", "memory"), ("DATABASE_MAX_CONNECTIONS", "0")],
    ] {
      assert!(matches!(AppConfig::from_lookup(lookup(&pairs)), Err(AppError::Config(_))));
    }
  }
}
