//! Repository for the `products` table.

use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::product::{CreateProduct, Product, UpdateProduct};

const COLUMNS: &str = "id, product_code, name, description, price, stock_quantity, \
                       category, created_by, created_at, updated_at";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProduct,
        created_by: Option<DbId>,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (product_code, name, description, price, stock_quantity, category, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.product_code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock_quantity)
            .bind(&input.category)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ids from `ids` that do not exist, in input order.
    pub async fn find_missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        let existing: Vec<DbId> = sqlx::query_scalar("SELECT id FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;
        let mut missing: Vec<DbId> = ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect();
        missing.dedup();
        Ok(missing)
    }

    /// List products with optional name/code search and category filter.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE ($1::TEXT IS NULL
                    OR product_code ILIKE '%' || $1 || '%'
                    OR name ILIKE '%' || $1 || '%')
               AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(search)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM products
             WHERE ($1::TEXT IS NULL
                    OR product_code ILIKE '%' || $1 || '%'
                    OR name ILIKE '%' || $1 || '%')
               AND ($2::TEXT IS NULL OR category = $2)",
        )
        .bind(search)
        .bind(category)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Update a product. Returns `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                product_code = COALESCE($2, product_code),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                stock_quantity = COALESCE($6, stock_quantity),
                category = COALESCE($7, category)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.product_code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock_quantity)
            .bind(&input.category)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product that no order item references.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let item_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if item_count > 0 {
            return Err(CoreError::Conflict(format!(
                "Product {id} is used by {item_count} order item(s) and cannot be deleted"
            ))
            .into());
        }

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
