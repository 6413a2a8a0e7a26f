//! Order status rules, order numbers, and line-item arithmetic.
//!
//! Everything here is pure. The repository layer calls these helpers before
//! opening a transaction (item validation, totals) and inside it (status
//! transitions against the locked row, order number formatting).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Money};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable from `self` in one step.
    ///
    /// - `pending`   -> `confirmed`, `cancelled`
    /// - `confirmed` -> `shipped`, `cancelled`
    /// - `shipped`   -> `delivered`
    /// - `delivered`, `cancelled` are terminal
    pub fn valid_transitions(self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid order status '{s}'. Must be one of: pending, confirmed, shipped, delivered, cancelled"
                ))
            })
    }
}

/// Validate a status change. Re-setting the current status is allowed.
pub fn validate_transition(current: OrderStatus, next: OrderStatus) -> Result<(), CoreError> {
    if current == next || current.valid_transitions().contains(&next) {
        return Ok(());
    }
    let allowed: Vec<&str> = current
        .valid_transitions()
        .iter()
        .map(|s| s.as_str())
        .collect();
    Err(CoreError::Conflict(format!(
        "Cannot transition order from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
    )))
}

// ---------------------------------------------------------------------------
// Order numbers
// ---------------------------------------------------------------------------

pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// `ORD` + `YYYYMMDD` + daily sequence padded to three digits.
///
/// Sequences above 999 widen instead of wrapping.
pub fn format_order_number(order_date: NaiveDate, sequence: i32) -> String {
    format!(
        "{ORDER_NUMBER_PREFIX}{}{sequence:03}",
        order_date.format("%Y%m%d")
    )
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// A line item as supplied by the client. Subtotals are always computed here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderItemInput {
    pub product_id: DbId,
    pub quantity: i32,
    pub unit_price: Money,
}

impl OrderItemInput {
    /// `quantity * unit_price`, or a validation error on overflow.
    pub fn subtotal(&self) -> Result<Money, CoreError> {
        Money::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Line amount overflows for product {}",
                    self.product_id
                ))
            })
    }
}

/// Reject empty item lists, non-positive quantities, and negative prices.
pub fn validate_items(items: &[OrderItemInput]) -> Result<(), CoreError> {
    if items.is_empty() {
        return Err(CoreError::Validation(
            "An order must contain at least one item".to_string(),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        if item.quantity <= 0 {
            return Err(CoreError::Validation(format!(
                "Item {index}: quantity must be greater than 0"
            )));
        }
        if item.unit_price < 0 {
            return Err(CoreError::Validation(format!(
                "Item {index}: unit price must not be negative"
            )));
        }
    }
    Ok(())
}

/// Sum of item subtotals with overflow checking.
pub fn compute_total(items: &[OrderItemInput]) -> Result<Money, CoreError> {
    items.iter().try_fold(0, |total: Money, item| {
        total
            .checked_add(item.subtotal()?)
            .ok_or_else(|| CoreError::Validation("Order total overflows".to_string()))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
