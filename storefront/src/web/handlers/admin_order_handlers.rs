// storefront/src/web/handlers/admin_order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OrderQuery, OrderStatus};
use crate::services::{order_lifecycle, order_queries};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePayload {
  pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
  pub rejection_reason: Option<String>,
  pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_all_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = order_queries::list_all(&app_state, auth_user.actor(), &query).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": orders.len(), "orders": orders })))
}

#[instrument(name = "handler::admin_order_stats", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn order_stats_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let stats = order_queries::stats(&app_state, auth_user.actor()).await?;
  Ok(HttpResponse::Ok().json(stats))
}

#[instrument(name = "handler::admin_recent_activity", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn recent_activity_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let activity = order_queries::recent_activity(&app_state, auth_user.actor(), &query).await?;
  Ok(HttpResponse::Ok().json(json!({ "activity": activity })))
}

#[instrument(name = "handler::approve_order", skip(app_state, path, payload, auth_user), fields(order_id = %path.as_ref()))]
pub async fn approve_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: Option<web::Json<ApprovePayload>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let admin_notes = payload.and_then(|p| p.into_inner().admin_notes);
  let order = order_lifecycle::approve_order(&app_state, auth_user.actor(), path.into_inner(), admin_notes).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order approved successfully.",
      "order": order
  })))
}

#[instrument(name = "handler::reject_order", skip(app_state, path, payload, auth_user), fields(order_id = %path.as_ref()))]
pub async fn reject_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<RejectPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let RejectPayload {
    rejection_reason,
    admin_notes,
  } = payload.into_inner();
  let order = order_lifecycle::reject_order(
    &app_state,
    auth_user.actor(),
    path.into_inner(),
    rejection_reason,
    admin_notes,
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order rejected.",
      "order": order
  })))
}

#[instrument(name = "handler::advance_fulfillment", skip(app_state, path, payload, auth_user), fields(order_id = %path.as_ref(), status = %payload.status))]
pub async fn advance_fulfillment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order =
    order_lifecycle::advance_fulfillment(&app_state, auth_user.actor(), path.into_inner(), payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": format!("Order is now {}.", order.status),
      "order": order
  })))
}
