// storefront/src/models/mod.rs

//! Data structures representing the order lifecycle's entities.

pub mod filters;
pub mod notification;
pub mod order;
pub mod product;
pub mod sale;
pub mod user;
pub mod views;

pub use filters::{DateBounds, OrderFilter, OrderQuery};
pub use notification::{Notification, NotificationKind};
pub use order::{
  LineItem, LineItemRequest, OrderDraft, OrderRecord, OrderStatus, PaymentDetails, PaymentMethod, PaymentStatus,
  ShippingAddress, ShippingAddressInput, StatusChange,
};
pub use product::{Product, StockChange};
pub use sale::{SaleRecord, SaleTotals};
pub use user::{Actor, Role, UserSummary};
pub use views::{ActivityEntry, AdminOrderView, LineProductView, OrderDetails, OrderStats, StatusTotals};
