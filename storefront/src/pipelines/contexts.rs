// storefront/src/pipelines/contexts.rs

//! Data carried through each lifecycle pipeline.
//! Handlers receive these wrapped in `orderflow::ContextData`.

use crate::models::{
  Actor, LineItem, OrderDraft, OrderRecord, OrderStatus, Product, ShippingAddress,
};
use crate::state::AppState;
use std::collections::HashMap;
use uuid::Uuid;

/// Implemented by contexts that act on one existing order; lets the shared steps in
/// `common_steps` serve several pipelines.
pub trait OrderActionCtx: Send + Sync + 'static {
  fn app_state(&self) -> &AppState;
  fn actor(&self) -> Actor;
  fn order_id(&self) -> Uuid;
  /// Past-tense verb used in error messages, e.g. "approved".
  fn action(&self) -> &'static str;
  fn loaded_order(&self) -> Option<&OrderRecord>;
  fn set_loaded_order(&mut self, order: OrderRecord);
}

macro_rules! order_action_ctx {
  ($ty:ty, $verb:expr) => {
    impl OrderActionCtx for $ty {
      fn app_state(&self) -> &AppState {
        &self.app_state
      }
      fn actor(&self) -> Actor {
        self.actor
      }
      fn order_id(&self) -> Uuid {
        self.order_id
      }
      fn action(&self) -> &'static str {
        $verb
      }
      fn loaded_order(&self) -> Option<&OrderRecord> {
        self.order.as_ref()
      }
      fn set_loaded_order(&mut self, order: OrderRecord) {
        self.order = Some(order);
      }
    }
  };
}

#[derive(Clone)]
pub struct CreateOrderCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub draft: OrderDraft,
  pub shipping_address: Option<ShippingAddress>,
  /// Products referenced by the draft, keyed by id.
  pub products: HashMap<Uuid, Product>,
  pub line_items: Vec<LineItem>,
  pub total_amount_cents: i64,
  pub created_order: Option<OrderRecord>,
}

impl CreateOrderCtxData {
  pub fn new(app_state: AppState, actor: Actor, draft: OrderDraft) -> Self {
    Self {
      app_state,
      actor,
      draft,
      shipping_address: None,
      products: HashMap::new(),
      line_items: Vec::new(),
      total_amount_cents: 0,
      created_order: None,
    }
  }
}

#[derive(Clone)]
pub struct ApproveOrderCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub order_id: Uuid,
  pub admin_notes: Option<String>,
  pub order: Option<OrderRecord>,
  /// `(product_id, quantity)` taken from stock so far, in application order.
  pub applied_decrements: Vec<(Uuid, i32)>,
  pub approved_order: Option<OrderRecord>,
}

impl ApproveOrderCtxData {
  pub fn new(app_state: AppState, actor: Actor, order_id: Uuid, admin_notes: Option<String>) -> Self {
    Self {
      app_state,
      actor,
      order_id,
      admin_notes,
      order: None,
      applied_decrements: Vec::new(),
      approved_order: None,
    }
  }
}

order_action_ctx!(ApproveOrderCtxData, "approved");

#[derive(Clone)]
pub struct RejectOrderCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub order_id: Uuid,
  pub rejection_reason: Option<String>,
  pub admin_notes: Option<String>,
  pub order: Option<OrderRecord>,
  pub rejected_order: Option<OrderRecord>,
}

impl RejectOrderCtxData {
  pub fn new(
    app_state: AppState,
    actor: Actor,
    order_id: Uuid,
    rejection_reason: Option<String>,
    admin_notes: Option<String>,
  ) -> Self {
    Self {
      app_state,
      actor,
      order_id,
      rejection_reason,
      admin_notes,
      order: None,
      rejected_order: None,
    }
  }
}

order_action_ctx!(RejectOrderCtxData, "rejected");

#[derive(Clone)]
pub struct CancelOrderCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub order_id: Uuid,
  pub order: Option<OrderRecord>,
  /// Set once this run has moved the order from `pending` to `cancelled`.
  pub cancelled_order: Option<OrderRecord>,
  /// `(product_id, quantity)` given back to stock so far.
  pub restocked: Vec<(Uuid, i32)>,
}

impl CancelOrderCtxData {
  pub fn new(app_state: AppState, actor: Actor, order_id: Uuid) -> Self {
    Self {
      app_state,
      actor,
      order_id,
      order: None,
      cancelled_order: None,
      restocked: Vec::new(),
    }
  }
}

order_action_ctx!(CancelOrderCtxData, "cancelled");

#[derive(Clone)]
pub struct DeleteOrdersCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub order_ids: Vec<Uuid>,
  pub orders: Vec<OrderRecord>,
  pub deleted_count: u64,
}

impl DeleteOrdersCtxData {
  pub fn new(app_state: AppState, actor: Actor, order_ids: Vec<Uuid>) -> Self {
    Self {
      app_state,
      actor,
      order_ids,
      orders: Vec::new(),
      deleted_count: 0,
    }
  }
}

#[derive(Clone)]
pub struct AdvanceFulfillmentCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub order_id: Uuid,
  pub target: OrderStatus,
  pub order: Option<OrderRecord>,
  pub updated_order: Option<OrderRecord>,
}

impl AdvanceFulfillmentCtxData {
  pub fn new(app_state: AppState, actor: Actor, order_id: Uuid, target: OrderStatus) -> Self {
    Self {
      app_state,
      actor,
      order_id,
      target,
      order: None,
      updated_order: None,
    }
  }
}

order_action_ctx!(AdvanceFulfillmentCtxData, "moved along fulfillment");
