use bizdesk_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table. `price` is in minor currency units.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub product_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub product_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub product_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
}
