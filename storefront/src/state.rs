// storefront/src/state.rs

use crate::config::{AppConfig, NotificationChannel, StorageBackend};
use crate::errors::{AppError, Result};
use crate::notifications::{
  EmailNotificationSink, LogNotificationSink, MemoryNotificationSink, NotificationSink, PgNotificationSink,
};
use crate::pipelines;
use crate::storage::{seed, MemoryStore, OrderStore, PgStore, ProductCatalog, SaleLedger, UserDirectory};
use orderflow::FlowRegistry;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a request or a pipeline step needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub products: Arc<dyn ProductCatalog>,
  pub orders: Arc<dyn OrderStore>,
  pub users: Arc<dyn UserDirectory>,
  pub sales: Arc<dyn SaleLedger>,
  pub notifier: Arc<dyn NotificationSink>,
}

impl AppState {
  /// Connects the configured backend and registers every lifecycle pipeline.
  pub async fn build(config: AppConfig) -> Result<Self> {
    match config.storage_backend {
      StorageBackend::Postgres => {
        let url = config
          .database_url
          .clone()
          .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
        let store = Arc::new(PgStore::connect(&url, config.database_max_connections).await?);
        if config.run_migrations {
          store.run_migrations().await?;
        }
        if config.seed_demo_data {
          warn!("SEED_DEMO_DATA is only honoured by the memory backend; skipping.");
        }
        let notifier: Arc<dyn NotificationSink> = match config.notification_channel {
          NotificationChannel::Database => Arc::new(PgNotificationSink::new(store.pool().clone())),
          NotificationChannel::Email => Arc::new(EmailNotificationSink::new(
            store.clone(),
            config.mock_email_sender.clone(),
          )),
          NotificationChannel::Log => Arc::new(LogNotificationSink),
        };
        Ok(Self::assemble(config, store.clone(), store.clone(), store.clone(), store, notifier))
      }
      StorageBackend::Memory => {
        let store = Arc::new(MemoryStore::new());
        if config.seed_demo_data {
          seed::seed_demo_data(&store);
        }
        let notifier: Arc<dyn NotificationSink> = match config.notification_channel {
          NotificationChannel::Database => Arc::new(MemoryNotificationSink::new()),
          NotificationChannel::Email => Arc::new(EmailNotificationSink::new(
            store.clone(),
            config.mock_email_sender.clone(),
          )),
          NotificationChannel::Log => Arc::new(LogNotificationSink),
        };
        Ok(Self::in_memory(config, store, notifier))
      }
    }
  }

  /// State over a single in-memory store.
  pub fn in_memory(config: AppConfig, store: Arc<MemoryStore>, notifier: Arc<dyn NotificationSink>) -> Self {
    Self::assemble(config, store.clone(), store.clone(), store.clone(), store, notifier)
  }

  fn assemble(
    config: AppConfig,
    products: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserDirectory>,
    sales: Arc<dyn SaleLedger>,
    notifier: Arc<dyn NotificationSink>,
  ) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    info!(pipelines = ?flows.pipeline_names(), "Application state assembled.");
    Self {
      config: Arc::new(config),
      flows,
      products,
      orders,
      users,
      sales,
      notifier,
    }
  }
}
