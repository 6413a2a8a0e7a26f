//! Shared query parameter types for API handlers.
//!
//! Pagination fields are repeated on each struct rather than flattened:
//! `serde(flatten)` routes values through a string buffer and breaks integer
//! parsing with `Query`.

use bizdesk_core::order::OrderStatus;
use bizdesk_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use bizdesk_core::types::DbId;
use serde::Deserialize;

/// Clamped `(limit, offset)`.
fn resolve_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        clamp_offset(offset),
    )
}

/// `?q=&category=&limit=&offset=` for catalog listings.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive match on code or name.
    pub q: Option<String>,
    /// Products only.
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    pub fn page(&self) -> (i64, i64) {
        resolve_page(self.limit, self.offset)
    }
}

/// `?customer_id=&status=&order_number=&limit=&offset=` for order listings.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    pub customer_id: Option<DbId>,
    pub status: Option<OrderStatus>,
    pub order_number: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderListParams {
    pub fn page(&self) -> (i64, i64) {
        resolve_page(self.limit, self.offset)
    }
}
