// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OrderDraft, OrderQuery};
use crate::services::{order_lifecycle, order_queries};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrdersPayload {
  #[serde(default)]
  pub order_ids: Vec<Uuid>,
}

#[instrument(name = "handler::create_order", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<OrderDraft>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_lifecycle::create_order(&app_state, auth_user.actor(), payload.into_inner()).await?;
  info!(order_id = %order.id, "Order created.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Order placed successfully and is awaiting approval.",
      "order": order
  })))
}

#[instrument(name = "handler::list_my_orders", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<OrderQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = order_queries::list_for_owner(&app_state, auth_user.actor(), &query).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": orders.len(), "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, path, auth_user), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let details = order_queries::get_by_id(&app_state, auth_user.actor(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": details })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, path, auth_user), fields(order_id = %path.as_ref()))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_lifecycle::cancel_order(&app_state, auth_user.actor(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order cancelled successfully.",
      "order": order
  })))
}

#[instrument(name = "handler::delete_order", skip(app_state, path, auth_user), fields(order_id = %path.as_ref()))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  order_lifecycle::delete_order(&app_state, auth_user.actor(), order_id).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Order deleted successfully.",
      "orderId": order_id
  })))
}

#[instrument(name = "handler::delete_orders", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_orders_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<DeleteOrdersPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let deleted = order_lifecycle::delete_orders(&app_state, auth_user.actor(), payload.into_inner().order_ids).await?;
  Ok(HttpResponse::Ok().json(json!({
      "message": format!("{} order(s) deleted successfully.", deleted),
      "deletedCount": deleted
  })))
}
