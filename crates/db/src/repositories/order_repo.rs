//! Repository for the order aggregate (`orders` + `order_items`).
//!
//! Every write touches the order row and its items in one transaction.
//! Totals and order numbers are computed here, never taken from the client.

use bizdesk_core::error::CoreError;
use bizdesk_core::order::{
    compute_total, format_order_number, validate_items, validate_transition, OrderItemInput,
    OrderStatus,
};
use bizdesk_core::types::DbId;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::order::{
    CreateOrder, Order, OrderDetail, OrderFilters, OrderItemDetail, OrderPage, OrderWithCustomer,
    UpdateOrder,
};

/// Column list for `RETURNING` and single-table selects.
const COLUMNS: &str = "id, order_number, customer_id, total_amount, status, order_date, \
                       created_by, created_at, updated_at";

/// Order columns joined with the customer summary (`o` = orders, `c` = customers).
const JOINED_COLUMNS: &str = "o.id, o.order_number, o.customer_id, o.total_amount, o.status, \
                              o.order_date, o.created_by, o.created_at, o.updated_at, \
                              c.customer_code, c.name AS customer_name";

const ITEM_DETAIL_COLUMNS: &str = "i.id, i.order_id, i.product_id, i.quantity, i.unit_price, \
                                   i.subtotal, i.created_at, \
                                   p.product_code, p.name AS product_name";

/// Shared WHERE clause for list/count. `$1` customer, `$2` status, `$3` number.
const FILTER_CLAUSE: &str = "($1::BIGINT IS NULL OR o.customer_id = $1)
               AND ($2::TEXT IS NULL OR o.status = $2)
               AND ($3::TEXT IS NULL OR o.order_number ILIKE '%' || $3 || '%')";

/// Provides transactional operations on orders and their items.
pub struct OrderRepo;

impl OrderRepo {
    /// Create an order with its items, dated `order_date`.
    ///
    /// The date selects the daily sequence; callers pass the server's current
    /// UTC date.
    ///
    /// Items are validated and the total computed before the transaction
    /// opens. Inside it the daily sequence is allocated, the order row and
    /// every item row are inserted; any failure rolls all of it back,
    /// including the sequence increment.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrder,
        order_date: NaiveDate,
        created_by: Option<DbId>,
    ) -> Result<OrderDetail, RepoError> {
        validate_items(&input.items)?;
        let total_amount = compute_total(&input.items)?;

        let mut tx = pool.begin().await?;

        let sequence = next_sequence(&mut *tx, order_date).await?;
        let order_number = format_order_number(order_date, sequence);

        let query = format!(
            "INSERT INTO orders
                (order_number, customer_id, total_amount, status, order_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&order_number)
            .bind(input.customer_id)
            .bind(total_amount)
            .bind(OrderStatus::default().as_str())
            .bind(order_date)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        insert_items(&mut *tx, order.id, &input.items).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            customer_id = order.customer_id,
            total_amount,
            item_count = input.items.len(),
            "Order created"
        );

        Self::find_by_id(pool, order.id)
            .await?
            .ok_or(RepoError::Core(CoreError::NotFound {
                entity: "order",
                id: order.id,
            }))
    }

    /// Apply a partial update to an order.
    ///
    /// The order row is locked for the whole transaction. A status change is
    /// checked against the locked row's current status. When `items` is
    /// supplied the existing items are replaced wholesale and the total is
    /// recomputed; otherwise items and total are left untouched.
    ///
    /// Returns `None` if the order does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrder,
    ) -> Result<Option<OrderDetail>, RepoError> {
        let new_total = match input.items.as_deref() {
            Some(items) => {
                validate_items(items)?;
                Some(compute_total(items)?)
            }
            None => None,
        };

        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(next) = input.status {
            let current_status: OrderStatus = current.status.parse()?;
            validate_transition(current_status, next)?;
        }

        if let Some(items) = input.items.as_deref() {
            sqlx::query("DELETE FROM order_items WHERE order_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_items(&mut *tx, id, items).await?;
        }

        sqlx::query(
            "UPDATE orders SET
                customer_id = COALESCE($2, customer_id),
                status = COALESCE($3, status),
                total_amount = COALESCE($4, total_amount)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.customer_id)
        .bind(input.status.map(OrderStatus::as_str))
        .bind(new_total)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = id,
            status = ?input.status,
            items_replaced = input.items.is_some(),
            "Order updated"
        );

        Ok(Self::find_by_id(pool, id).await?)
    }

    /// Delete an order and its items. Returns `true` if the order existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(order_id = id, "Order deleted");
        }
        Ok(deleted)
    }

    /// Load the full aggregate: order, customer summary, items with product
    /// summaries.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OrderDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM orders o
             JOIN customers c ON c.id = o.customer_id
             WHERE o.id = $1"
        );
        let order = sqlx::query_as::<_, OrderWithCustomer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match order {
            Some(order) => Ok(Some(Self::attach_items(pool, order).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_order_number(
        pool: &PgPool,
        order_number: &str,
    ) -> Result<Option<OrderDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM orders o
             JOIN customers c ON c.id = o.customer_id
             WHERE o.order_number = $1"
        );
        let order = sqlx::query_as::<_, OrderWithCustomer>(&query)
            .bind(order_number)
            .fetch_optional(pool)
            .await?;

        match order {
            Some(order) => Ok(Some(Self::attach_items(pool, order).await?)),
            None => Ok(None),
        }
    }

    /// Items of one order with product summaries, in insertion order.
    pub async fn list_items(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderItemDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_DETAIL_COLUMNS}
             FROM order_items i
             JOIN products p ON p.id = i.product_id
             WHERE i.order_id = $1
             ORDER BY i.id"
        );
        sqlx::query_as::<_, OrderItemDetail>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// One page of orders, newest first, with the total matching count.
    ///
    /// `limit` and `offset` are expected to be clamped by the caller.
    pub async fn list(
        pool: &PgPool,
        filters: &OrderFilters,
        limit: i64,
        offset: i64,
    ) -> Result<OrderPage, sqlx::Error> {
        let status = filters.status.map(OrderStatus::as_str);
        let order_number = filters.order_number.as_deref();

        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM orders o
             JOIN customers c ON c.id = o.customer_id
             WHERE {FILTER_CLAUSE}
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, OrderWithCustomer>(&query)
            .bind(filters.customer_id)
            .bind(status)
            .bind(order_number)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM orders o WHERE {FILTER_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filters.customer_id)
            .bind(status)
            .bind(order_number)
            .fetch_one(pool)
            .await?;

        Ok(OrderPage {
            items,
            total,
            limit,
            offset,
        })
    }

    async fn attach_items(
        pool: &PgPool,
        order: OrderWithCustomer,
    ) -> Result<OrderDetail, sqlx::Error> {
        let items = Self::list_items(pool, order.order.id).await?;
        Ok(OrderDetail { order, items })
    }
}

/// Allocate the next sequence number for `order_date`.
///
/// The upsert takes a row lock on the day's counter that is held until the
/// surrounding transaction ends, so concurrent creates on the same day get
/// distinct values.
async fn next_sequence(conn: &mut PgConnection, order_date: NaiveDate) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO order_sequences (order_date, last_value)
         VALUES ($1, 1)
         ON CONFLICT (order_date)
         DO UPDATE SET last_value = order_sequences.last_value + 1
         RETURNING last_value",
    )
    .bind(order_date)
    .fetch_one(&mut *conn)
    .await
}

async fn insert_items(
    conn: &mut PgConnection,
    order_id: DbId,
    items: &[OrderItemInput],
) -> Result<(), RepoError> {
    for item in items {
        let subtotal = item.subtotal()?;
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(subtotal)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
