// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Approved,
  Rejected,
  Cancelled,
  Completed,
  Processing,
  Shipped,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 7] = [
    OrderStatus::Pending,
    OrderStatus::Approved,
    OrderStatus::Rejected,
    OrderStatus::Cancelled,
    OrderStatus::Completed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
  ];

  /// Statuses an owner may delete an order in.
  pub const DELETABLE: [OrderStatus; 3] = [OrderStatus::Completed, OrderStatus::Cancelled, OrderStatus::Rejected];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Approved => "approved",
      OrderStatus::Rejected => "rejected",
      OrderStatus::Cancelled => "cancelled",
      OrderStatus::Completed => "completed",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
    }
  }

  /// Approved orders that have moved on into fulfillment.
  pub fn is_in_fulfillment(&self) -> bool {
    matches!(self, OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Completed)
  }

  pub fn is_deletable(&self) -> bool {
    Self::DELETABLE.contains(self)
  }

  /// The only status an admin may move this one to after approval.
  pub fn next_fulfillment(&self) -> Option<OrderStatus> {
    match self {
      OrderStatus::Approved => Some(OrderStatus::Processing),
      OrderStatus::Processing => Some(OrderStatus::Shipped),
      OrderStatus::Shipped => Some(OrderStatus::Completed),
      _ => None,
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase();
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == wanted)
      .ok_or_else(|| format!("Unknown order status '{}'", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Verified,
  Paid,
  Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method_enum", rename_all = "snake_case")]
pub enum PaymentMethod {
  #[serde(rename = "Cash on Delivery")]
  CashOnDelivery,
  #[serde(rename = "Card")]
  Card,
  #[serde(rename = "Bank Transfer")]
  BankTransfer,
  #[serde(rename = "Mobile Banking")]
  MobileBanking,
}

impl PaymentMethod {
  /// Every method except cash on delivery is paid before approval and needs a transaction id.
  pub fn is_prepaid(&self) -> bool {
    !matches!(self, PaymentMethod::CashOnDelivery)
  }

  pub fn label(&self) -> &'static str {
    match self {
      PaymentMethod::CashOnDelivery => "Cash on Delivery",
      PaymentMethod::Card => "Card",
      PaymentMethod::BankTransfer => "Bank Transfer",
      PaymentMethod::MobileBanking => "Mobile Banking",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price_cents: i64,
}

/// Largest unit price a caller may set on a line (ten million in major units).
pub const MAX_UNIT_PRICE_CENTS: i64 = 1_000_000_000;

impl LineItem {
  /// `quantity * unitPrice`, `None` on overflow.
  pub fn subtotal_cents(&self) -> Option<i64> {
    self.unit_price_cents.checked_mul(i64::from(self.quantity))
  }
}

/// Sum of `quantity * unitPrice` over the lines, `None` on overflow.
pub fn total_cents(lines: &[LineItem]) -> Option<i64> {
  lines
    .iter()
    .try_fold(0i64, |total, line| total.checked_add(line.subtotal_cents()?))
}

/// Renders minor units as `"1234.50"`.
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub full_name: String,
  pub phone: String,
  pub street: String,
  pub city: String,
  pub zip: String,
  pub state: Option<String>,
  pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
  pub transaction_id: Option<String>,
  pub sender: Option<String>,
  pub receiver: Option<String>,
  pub note: Option<String>,
}

impl PaymentDetails {
  pub fn has_transaction_id(&self) -> bool {
    self
      .transaction_id
      .as_deref()
      .map(|t| !t.trim().is_empty())
      .unwrap_or(false)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
  pub id: Uuid,
  pub owner_id: Uuid,
  pub line_items: Vec<LineItem>,
  pub total_amount_cents: i64,
  pub status: OrderStatus,
  pub shipping_address: ShippingAddress,
  pub payment_method: PaymentMethod,
  pub payment_details: PaymentDetails,
  pub payment_status: PaymentStatus,
  pub admin_notes: Option<String>,
  pub rejection_reason: Option<String>,
  pub approved_by: Option<Uuid>,
  pub approved_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields written by a guarded status transition. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
  pub status: OrderStatus,
  pub payment_status: Option<PaymentStatus>,
  pub admin_notes: Option<String>,
  pub rejection_reason: Option<String>,
  pub approved_by: Option<Uuid>,
  pub approved_at: Option<DateTime<Utc>>,
}

impl StatusChange {
  pub fn to(status: OrderStatus) -> Self {
    Self {
      status,
      payment_status: None,
      admin_notes: None,
      rejection_reason: None,
      approved_by: None,
      approved_at: None,
    }
  }

  pub fn payment(mut self, payment_status: PaymentStatus) -> Self {
    self.payment_status = Some(payment_status);
    self
  }

  pub fn notes(mut self, admin_notes: Option<String>) -> Self {
    self.admin_notes = admin_notes;
    self
  }

  pub fn reason(mut self, rejection_reason: String) -> Self {
    self.rejection_reason = Some(rejection_reason);
    self
  }

  pub fn approved(mut self, by: Uuid, at: DateTime<Utc>) -> Self {
    self.approved_by = Some(by);
    self.approved_at = Some(at);
    self
  }

  pub fn apply(&self, order: &mut OrderRecord, now: DateTime<Utc>) {
    order.status = self.status;
    if let Some(ps) = self.payment_status {
      order.payment_status = ps;
    }
    if self.admin_notes.is_some() {
      order.admin_notes = self.admin_notes.clone();
    }
    if self.rejection_reason.is_some() {
      order.rejection_reason = self.rejection_reason.clone();
    }
    if self.approved_by.is_some() {
      order.approved_by = self.approved_by;
    }
    if self.approved_at.is_some() {
      order.approved_at = self.approved_at;
    }
    order.updated_at = now;
  }
}

// --- Creation request ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
  pub product_id: Uuid,
  pub quantity: i32,
  /// Overrides the product's current price when present.
  pub unit_price_cents: Option<i64>,
}

/// Shipping fields as submitted; presence is checked during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressInput {
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub street: Option<String>,
  pub city: Option<String>,
  pub zip: Option<String>,
  pub state: Option<String>,
  pub country: Option<String>,
}

impl ShippingAddressInput {
  /// Returns the completed address, or the names of the missing required fields.
  pub fn complete(&self, default_country: &str) -> Result<ShippingAddress, Vec<&'static str>> {
    fn present(v: &Option<String>) -> Option<String> {
      v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
    }

    let mut missing = Vec::new();
    let mut required = |value: &Option<String>, name: &'static str| {
      let v = present(value);
      if v.is_none() {
        missing.push(name);
      }
      v.unwrap_or_default()
    };
    let full_name = required(&self.full_name, "fullName");
    let phone = required(&self.phone, "phone");
    let street = required(&self.street, "street");
    let city = required(&self.city, "city");
    let zip = required(&self.zip, "zip");

    if !missing.is_empty() {
      return Err(missing);
    }
    Ok(ShippingAddress {
      full_name,
      phone,
      street,
      city,
      zip,
      state: present(&self.state),
      country: present(&self.country).unwrap_or_else(|| default_country.to_string()),
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
  #[serde(default)]
  pub line_items: Vec<LineItemRequest>,
  #[serde(default)]
  pub shipping_address: ShippingAddressInput,
  pub payment_method: Option<PaymentMethod>,
  #[serde(default)]
  pub payment_details: PaymentDetails,
}
