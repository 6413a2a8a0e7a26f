//! Repository for the `permission_grants` table.
//!
//! Grants are keyed by `(user_id, entity_type, operation_type, screen_name)`.
//! A missing row is a denial, never an error.

use async_trait::async_trait;
use bizdesk_core::authz::GrantStore;
use bizdesk_core::permissions::{
    validate_grants, validate_screen_name, GrantSpec, PermissionKey, StoredGrant,
};
use bizdesk_core::provisioning::RoleGrantTable;
use bizdesk_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::permission::PermissionGrant;

const COLUMNS: &str = "id, user_id, entity_type, operation_type, screen_name, is_allowed, \
                       created_at, updated_at";

/// Provides grant storage and lookup.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Upsert a single grant. Returns `true` if a row was written.
    pub async fn grant(
        pool: &PgPool,
        user_id: DbId,
        key: &PermissionKey,
        is_allowed: bool,
    ) -> Result<bool, RepoError> {
        validate_screen_name(&key.screen_name)?;

        let result = sqlx::query(
            "INSERT INTO permission_grants
                (user_id, entity_type, operation_type, screen_name, is_allowed)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_permission_grants_key
             DO UPDATE SET is_allowed = EXCLUDED.is_allowed",
        )
        .bind(user_id)
        .bind(key.entity_type.as_str())
        .bind(key.operation_type.as_str())
        .bind(&*key.screen_name)
        .bind(is_allowed)
        .execute(pool)
        .await?;

        tracing::info!(user_id, grant = %key, is_allowed, "Permission grant written");
        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` holds an allowed grant for `key`.
    ///
    /// Returns `false` when no row exists.
    pub async fn check(
        pool: &PgPool,
        user_id: DbId,
        key: &PermissionKey,
    ) -> Result<bool, sqlx::Error> {
        let allowed: Option<bool> = sqlx::query_scalar(
            "SELECT is_allowed FROM permission_grants
             WHERE user_id = $1
               AND entity_type = $2
               AND operation_type = $3
               AND screen_name = $4",
        )
        .bind(user_id)
        .bind(key.entity_type.as_str())
        .bind(key.operation_type.as_str())
        .bind(&*key.screen_name)
        .fetch_optional(pool)
        .await?;
        Ok(allowed.unwrap_or(false))
    }

    /// Replace every grant of `user_id` with `grants`.
    ///
    /// Runs in one transaction: delete all, then insert each. If any insert
    /// fails (constraint violation, duplicate tuple in `grants`) the previous
    /// grant set is left intact.
    pub async fn replace_all(
        pool: &PgPool,
        user_id: DbId,
        grants: &[GrantSpec],
    ) -> Result<(), RepoError> {
        validate_grants(grants)?;

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM permission_grants WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for grant in grants {
            sqlx::query(
                "INSERT INTO permission_grants
                    (user_id, entity_type, operation_type, screen_name, is_allowed)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(user_id)
            .bind(grant.entity_type.as_str())
            .bind(grant.operation_type.as_str())
            .bind(&grant.screen_name)
            .bind(grant.is_allowed)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(user_id, grant_count = grants.len(), "Permission grants replaced");
        Ok(())
    }

    /// Grants of one user, ordered by entity type then screen name.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PermissionGrant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM permission_grants
             WHERE user_id = $1
             ORDER BY entity_type, screen_name, operation_type"
        );
        sqlx::query_as::<_, PermissionGrant>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every grant in the system, converted to domain values.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<StoredGrant>, RepoError> {
        let query = format!(
            "SELECT {COLUMNS} FROM permission_grants
             ORDER BY user_id, entity_type, screen_name, operation_type"
        );
        let rows = sqlx::query_as::<_, PermissionGrant>(&query)
            .fetch_all(pool)
            .await?;
        rows.into_iter()
            .map(|row| StoredGrant::try_from(row).map_err(RepoError::from))
            .collect()
    }

    /// Seed the default grant set for `role`.
    ///
    /// Replaces whatever the user had. An unknown role provisions nothing and
    /// leaves the user with no grants. Returns the number of grants written.
    pub async fn provision_defaults(
        pool: &PgPool,
        user_id: DbId,
        role: &str,
        table: &RoleGrantTable,
    ) -> Result<usize, RepoError> {
        let Some(grants) = table.grants_for(role) else {
            tracing::warn!(user_id, role, "No default grants for unknown role");
            return Ok(0);
        };

        Self::replace_all(pool, user_id, grants).await?;
        tracing::info!(user_id, role, grant_count = grants.len(), "Default grants provisioned");
        Ok(grants.len())
    }
}

/// [`GrantStore`] backed by the `permission_grants` table.
#[derive(Clone)]
pub struct PgGrantStore {
    pool: PgPool,
}

impl PgGrantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantStore for PgGrantStore {
    type Error = sqlx::Error;

    async fn check(&self, user_id: DbId, key: &PermissionKey) -> Result<bool, Self::Error> {
        PermissionRepo::check(&self.pool, user_id, key).await
    }
}
