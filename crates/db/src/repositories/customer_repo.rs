//! Repository for the `customers` table.

use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};

const COLUMNS: &str = "id, customer_code, name, email, phone, address, \
                       created_by, created_at, updated_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCustomer,
        created_by: Option<DbId>,
    ) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (customer_code, name, email, phone, address, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.customer_code)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List customers, optionally filtered by a case-insensitive match on
    /// code or name.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers
             WHERE ($1::TEXT IS NULL
                    OR customer_code ILIKE '%' || $1 || '%'
                    OR name ILIKE '%' || $1 || '%')
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM customers
             WHERE ($1::TEXT IS NULL
                    OR customer_code ILIKE '%' || $1 || '%'
                    OR name ILIKE '%' || $1 || '%')",
        )
        .bind(search)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Update a customer. Returns `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                customer_code = COALESCE($2, customer_code),
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&input.customer_code)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .fetch_optional(pool)
            .await
    }

    /// Delete a customer that no order references.
    ///
    /// The customer row is locked first so no order can start referencing it
    /// between the check and the delete.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM customers WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let order_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if order_count > 0 {
            return Err(CoreError::Conflict(format!(
                "Customer {id} has {order_count} order(s) and cannot be deleted"
            ))
            .into());
        }

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
