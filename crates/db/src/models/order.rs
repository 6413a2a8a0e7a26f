//! Order aggregate models: order rows, item rows, and the joined detail view.

use bizdesk_core::order::{OrderItemInput, OrderStatus};
use bizdesk_core::types::{DbId, Money, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row from the `orders` table.
///
/// `status` is kept as the stored text; parse it with
/// [`OrderStatus::from_str`](std::str::FromStr) when rules need it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub customer_id: DbId,
    pub total_amount: Money,
    pub status: String,
    pub order_date: NaiveDate,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub product_id: DbId,
    pub quantity: i32,
    pub unit_price: Money,
    pub subtotal: Money,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Joined views
// ---------------------------------------------------------------------------

/// An order with its customer summary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderWithCustomer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_code: String,
    pub customer_name: String,
}

/// An order item with its product summary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_code: String,
    pub product_name: String,
}

/// The full aggregate as returned by reads.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderWithCustomer,
    pub items: Vec<OrderItemDetail>,
}

impl OrderDetail {
    pub fn id(&self) -> DbId {
        self.order.order.id
    }

    pub fn total_amount(&self) -> Money {
        self.order.order.total_amount
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Input for creating an order. Totals, the order number, and the order date
/// are never accepted from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub customer_id: DbId,
    pub items: Vec<OrderItemInput>,
}

/// Partial update. `items`, when present, replaces every existing line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrder {
    pub customer_id: Option<DbId>,
    pub status: Option<OrderStatus>,
    pub items: Option<Vec<OrderItemInput>>,
}

/// Optional filters for listing orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilters {
    pub customer_id: Option<DbId>,
    pub status: Option<OrderStatus>,
    /// Substring match on the order number.
    pub order_number: Option<String>,
}

/// One page of orders plus the unpaginated count.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub items: Vec<OrderWithCustomer>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
