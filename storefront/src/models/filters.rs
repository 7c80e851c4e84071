// storefront/src/models/filters.rs

use crate::errors::{AppError, Result};
use crate::models::order::{OrderRecord, OrderStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Half-open time window `[from, until)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
  pub from: Option<DateTime<Utc>>,
  pub until: Option<DateTime<Utc>>,
}

impl DateBounds {
  /// `date_to` covers its whole calendar day (UTC).
  pub fn from_dates(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
    let from = date_from.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc());
    let until = date_to.map(|d| {
      d.checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
    });
    Self { from, until }
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.from.map_or(true, |from| at >= from) && self.until.map_or(true, |until| at < until)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
  /// Restricts the listing to one owner; `None` lists every owner.
  pub owner_id: Option<Uuid>,
  pub status: Option<OrderStatus>,
  pub dates: DateBounds,
  /// Keep only the newest `limit` orders.
  pub limit: Option<usize>,
}

impl OrderFilter {
  pub fn for_owner(owner_id: Uuid) -> Self {
    Self {
      owner_id: Some(owner_id),
      ..Default::default()
    }
  }

  pub fn matches(&self, order: &OrderRecord) -> bool {
    self.owner_id.map_or(true, |owner| order.owner_id == owner)
      && self.status.map_or(true, |status| order.status == status)
      && self.dates.contains(order.created_at)
  }
}

/// Listing filters as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
  pub status: Option<OrderStatus>,
  pub date_from: Option<NaiveDate>,
  pub date_to: Option<NaiveDate>,
  pub limit: Option<usize>,
}

impl OrderQuery {
  pub fn bounds(&self) -> Result<DateBounds> {
    if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
      if from > to {
        return Err(AppError::Validation(format!(
          "dateFrom ({}) must not be after dateTo ({})",
          from, to
        )));
      }
    }
    Ok(DateBounds::from_dates(self.date_from, self.date_to))
  }

  pub fn to_filter(&self, owner_id: Option<Uuid>) -> Result<OrderFilter> {
    Ok(OrderFilter {
      owner_id,
      status: self.status,
      dates: self.bounds()?,
      limit: None,
    })
  }
}
