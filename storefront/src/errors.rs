// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use orderflow::FlowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Unavailable: {0}")]
  Unavailable(String),

  #[error("Invalid Transition: {0}")]
  InvalidTransition(String),

  #[error("Insufficient stock for '{product_name}': only {available} available, {requested} requested")]
  InsufficientStock {
    product_name: String,
    available: i32,
    requested: i32,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  #[error("Pipeline execution was halted by a handler.")]
  PipelineHalted,
}

impl AppError {
  /// Short machine-readable kind used in response bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "validation_error",
      AppError::Auth(_) => "unauthenticated",
      AppError::Forbidden(_) => "forbidden",
      AppError::NotFound(_) => "not_found",
      AppError::Unavailable(_) => "unavailable",
      AppError::InvalidTransition(_) => "invalid_transition",
      AppError::InsufficientStock { .. } => "insufficient_stock",
      _ => "server_error",
    }
  }

  pub fn is_server_error(&self) -> bool {
    self.status_code().is_server_error()
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<AppError>() {
      Ok(app_err) => return app_err,
      Err(other) => other,
    };
    match err.downcast::<sqlx::Error>() {
      Ok(db_err) => AppError::Sqlx(db_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl From<sqlx::migrate::MigrateError> for AppError {
  fn from(err: sqlx::migrate::MigrateError) -> Self {
    AppError::Config(format!("Database migration failed: {}", err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Unavailable(_) | AppError::InvalidTransition(_) | AppError::InsufficientStock { .. } => {
        StatusCode::CONFLICT
      }
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_)
      | AppError::PipelineHalted => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      // Detail stays in the logs.
      tracing::error!(application_error = %self, "Responding with server error");
      return HttpResponse::build(status).json(json!({
          "error": self.kind(),
          "message": "An internal error occurred"
      }));
    }

    tracing::warn!(application_error = %self, "Responding with client error");
    match self {
      AppError::InsufficientStock {
        product_name,
        available,
        requested,
      } => HttpResponse::build(status).json(json!({
          "error": self.kind(),
          "message": self.to_string(),
          "productName": product_name,
          "available": available,
          "requested": requested
      })),
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Unavailable(m)
      | AppError::InvalidTransition(m) => HttpResponse::build(status).json(json!({
          "error": self.kind(),
          "message": m
      })),
      _ => HttpResponse::build(status).json(json!({ "error": self.kind() })),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
