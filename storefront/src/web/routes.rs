// storefront/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{admin_order_handlers, order_handlers};
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies, query strings and path ids are validation errors, not actix defaults.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid request body: {}", err)).into()),
    )
    .app_data(
      web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query parameters: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into()),
    );
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_my_orders_handler))
          .route("", web::delete().to(order_handlers::delete_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}", web::delete().to(order_handlers::delete_order_handler))
          .route("/{order_id}/cancel", web::patch().to(order_handlers::cancel_order_handler)),
      )
      .service(
        web::scope("/admin/orders")
          .route("", web::get().to(admin_order_handlers::list_all_orders_handler))
          .route("/stats", web::get().to(admin_order_handlers::order_stats_handler))
          .route("/activity", web::get().to(admin_order_handlers::recent_activity_handler))
          .route(
            "/{order_id}/approve",
            web::patch().to(admin_order_handlers::approve_order_handler),
          )
          .route(
            "/{order_id}/reject",
            web::patch().to(admin_order_handlers::reject_order_handler),
          )
          .route(
            "/{order_id}/status",
            web::patch().to(admin_order_handlers::advance_fulfillment_handler),
          ),
      ),
  );
}
