//! Repository for the `users` table.

use bizdesk_core::error::CoreError;
use bizdesk_core::roles::{is_admin, ROLE_ADMIN};
use bizdesk_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by username.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY username");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Demoting the only remaining admin fails with
    /// [`CoreError::InvariantViolation`]. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, RepoError> {
        let mut tx = pool.begin().await?;

        if let Some(role) = input.role.as_deref() {
            if !is_admin(role) {
                let admin_ids = lock_admin_ids(&mut *tx).await?;
                ensure_not_last_admin(&admin_ids, id, "demote")?;
            }
        }

        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Delete a user. Their permission grants are removed by cascade.
    ///
    /// Deleting the only remaining admin fails with
    /// [`CoreError::InvariantViolation`]. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        let admin_ids = lock_admin_ids(&mut *tx).await?;
        ensure_not_last_admin(&admin_ids, id, "delete")?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(user_id = id, "User deleted");
        }
        Ok(deleted)
    }
}

/// Lock every admin row, in id order, and return their ids.
///
/// Holding these locks until commit serializes concurrent deletions and
/// demotions of admins.
async fn lock_admin_ids(conn: &mut PgConnection) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM users WHERE role = $1 ORDER BY id FOR UPDATE")
        .bind(ROLE_ADMIN)
        .fetch_all(&mut *conn)
        .await
}

fn ensure_not_last_admin(admin_ids: &[DbId], target: DbId, action: &str) -> Result<(), CoreError> {
    if admin_ids.len() == 1 && admin_ids[0] == target {
        tracing::warn!(user_id = target, action, "Refused to remove the last administrator");
        return Err(CoreError::InvariantViolation(format!(
            "Cannot {action} the last administrator"
        )));
    }
    Ok(())
}
