// tests/http_tests.rs

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::{role_of, test_app};
use serde_json::{json, Value};
use serial_test::serial;
use storefront::config::AppConfig;
use storefront::models::Actor;
use storefront::state::AppState;
use storefront::web::configure_app_routes;
use uuid::Uuid;

macro_rules! service {
  ($app:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($app.state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn as_actor(req: test::TestRequest, actor: &Actor) -> test::TestRequest {
  req
    .insert_header(("X-User-ID", actor.user_id.to_string()))
    .insert_header(("X-User-Role", role_of(actor)))
}

fn order_body(product_id: Uuid, quantity: i32, method: &str) -> Value {
  json!({
    "lineItems": [{ "productId": product_id, "quantity": quantity }],
    "shippingAddress": {
      "fullName": "Carla Customer",
      "phone": "+8801700000000",
      "street": "12 Lake Road",
      "city": "Dhaka",
      "zip": "1205"
    },
    "paymentMethod": method,
    "paymentDetails": {}
  })
}

#[actix_rt::test]
async fn health_endpoint_reports_ok() {
  let app = test_app();
  let svc = service!(app);
  let resp = test::call_service(&svc, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn order_endpoints_require_an_identity() {
  let app = test_app();
  let svc = service!(app);
  let resp = test::call_service(&svc, test::TestRequest::get().uri("/api/v1/orders").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "unauthenticated");

  let req = test::TestRequest::get()
    .uri("/api/v1/orders")
    .insert_header(("X-User-ID", "not-a-uuid"))
    .to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn full_order_flow_over_http() {
  let app = test_app();
  let p = app.add_product("Kettle", 25_00, 3);
  let svc = service!(app);

  let req = as_actor(test::TestRequest::post().uri("/api/v1/orders"), &app.customer)
    .set_json(order_body(p, 2, "Cash on Delivery"))
    .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  let order_id = body["order"]["id"].as_str().unwrap().to_string();
  assert_eq!(body["order"]["status"], "pending");
  assert_eq!(body["order"]["totalAmountCents"], 50_00);
  assert_eq!(body["order"]["paymentMethod"], "Cash on Delivery");

  let req = as_actor(
    test::TestRequest::patch().uri(&format!("/api/v1/admin/orders/{}/approve", order_id)),
    &app.customer,
  )
  .to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::FORBIDDEN);

  let req = as_actor(
    test::TestRequest::patch().uri(&format!("/api/v1/admin/orders/{}/approve", order_id)),
    &app.admin,
  )
  .set_json(json!({ "adminNotes": "ok" }))
  .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["status"], "approved");
  assert_eq!(app.stock(p), 1);

  let req = as_actor(
    test::TestRequest::patch().uri(&format!("/api/v1/admin/orders/{}/approve", order_id)),
    &app.admin,
  )
  .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "invalid_transition");
  assert!(body["message"].as_str().unwrap().contains("approved"));

  let req = as_actor(test::TestRequest::get().uri(&format!("/api/v1/orders/{}", order_id)), &app.customer)
    .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["products"][0]["name"], "Kettle");
  assert_eq!(body["order"]["owner"]["name"], "Carla Customer");

  for status in ["processing", "shipped", "completed"] {
    let req = as_actor(
      test::TestRequest::patch().uri(&format!("/api/v1/admin/orders/{}/status", order_id)),
      &app.admin,
    )
    .set_json(json!({ "status": status }))
    .to_request();
    let resp = test::call_service(&svc, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  let req = as_actor(test::TestRequest::delete().uri(&format!("/api/v1/orders/{}", order_id)), &app.customer)
    .to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::OK);
  assert_eq!(app.store.order_count(), 0);
}

#[actix_rt::test]
async fn client_errors_carry_their_details() {
  let app = test_app();
  let p = app.add_product("Desk Lamp", 40_00, 2);
  let svc = service!(app);

  let req = as_actor(test::TestRequest::post().uri("/api/v1/orders"), &app.customer)
    .set_json(order_body(p, 5, "Cash on Delivery"))
    .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "insufficient_stock");
  assert_eq!(body["productName"], "Desk Lamp");
  assert_eq!(body["available"], 2);
  assert_eq!(body["requested"], 5);

  let req = as_actor(test::TestRequest::post().uri("/api/v1/orders"), &app.customer)
    .set_json(order_body(p, 1, "Card"))
    .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation_error");

  let req = as_actor(test::TestRequest::post().uri("/api/v1/orders"), &app.customer)
    .set_json(json!({ "lineItems": "nope" }))
    .to_request();
  let resp = test::call_service(&svc, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = as_actor(test::TestRequest::get().uri("/api/v1/orders?status=lost"), &app.customer).to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::BAD_REQUEST);

  let req = as_actor(test::TestRequest::get().uri("/api/v1/orders/12345"), &app.customer).to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::BAD_REQUEST);

  let req = as_actor(
    test::TestRequest::get().uri(&format!("/api/v1/orders/{}", Uuid::new_v4())),
    &app.customer,
  )
  .to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn bulk_delete_and_admin_views() {
  let app = test_app();
  let p = app.add_product("Kettle", 25_00, 10);
  let svc = service!(app);

  let mut ids = Vec::new();
  for _ in 0..2 {
    let req = as_actor(test::TestRequest::post().uri("/api/v1/orders"), &app.customer)
      .set_json(order_body(p, 1, "Cash on Delivery"))
      .to_request();
    let body: Value = test::call_and_read_body_json(&svc, req).await;
    let id = body["order"]["id"].as_str().unwrap().to_string();
    let req = as_actor(
      test::TestRequest::patch().uri(&format!("/api/v1/orders/{}/cancel", id)),
      &app.customer,
    )
    .to_request();
    assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::OK);
    ids.push(id);
  }

  let req = as_actor(test::TestRequest::get().uri("/api/v1/admin/orders"), &app.admin).to_request();
  let body: Value = test::call_and_read_body_json(&svc, req).await;
  assert_eq!(body["count"], 2);
  assert_eq!(body["orders"][0]["owner"]["name"], "Carla Customer");

  let req = as_actor(test::TestRequest::get().uri("/api/v1/admin/orders/stats"), &app.admin).to_request();
  let body: Value = test::call_and_read_body_json(&svc, req).await;
  assert_eq!(body["totalOrders"], 2);
  assert_eq!(body["perStatusCounts"]["cancelled"], 2);
  assert_eq!(body["totalRevenueCents"], 0);

  let req = as_actor(test::TestRequest::get().uri("/api/v1/admin/orders/activity?limit=1"), &app.admin).to_request();
  let body: Value = test::call_and_read_body_json(&svc, req).await;
  assert_eq!(body["activity"].as_array().unwrap().len(), 1);
  assert_eq!(body["activity"][0]["source"], "order");

  let req = as_actor(test::TestRequest::delete().uri("/api/v1/orders"), &app.other_customer)
    .set_json(json!({ "orderIds": ids }))
    .to_request();
  assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::FORBIDDEN);

  let req = as_actor(test::TestRequest::delete().uri("/api/v1/orders"), &app.customer)
    .set_json(json!({ "orderIds": ids }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&svc, req).await;
  assert_eq!(body["deletedCount"], 2);
  assert_eq!(app.store.order_count(), 0);
}

#[actix_rt::test]
#[serial]
async fn state_builds_from_environment_with_seeded_memory_backend() {
  std::env::set_var("STORAGE_BACKEND", "memory");
  std::env::set_var("SEED_DEMO_DATA", "true");
  std::env::set_var("NOTIFICATION_CHANNEL", "log");
  let config = AppConfig::from_env().unwrap();
  std::env::remove_var("STORAGE_BACKEND");
  std::env::remove_var("SEED_DEMO_DATA");
  std::env::remove_var("NOTIFICATION_CHANNEL");

  let state = AppState::build(config).await.unwrap();
  assert_eq!(
    state.flows.pipeline_names(),
    vec![
      "advance_fulfillment",
      "approve_order",
      "cancel_order",
      "create_order",
      "delete_orders",
      "reject_order"
    ]
  );
  assert_eq!(state.users.admin_ids().await.unwrap().len(), 1);
}
