//! Permission grant rows.

use bizdesk_core::error::CoreError;
use bizdesk_core::permissions::StoredGrant;
use bizdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `permission_grants` table.
///
/// Entity and operation types are stored as text and constrained by CHECKs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PermissionGrant {
    pub id: DbId,
    pub user_id: DbId,
    pub entity_type: String,
    pub operation_type: String,
    pub screen_name: String,
    pub is_allowed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PermissionGrant> for StoredGrant {
    type Error = CoreError;

    fn try_from(row: PermissionGrant) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            entity_type: row.entity_type.parse()?,
            operation_type: row.operation_type.parse()?,
            screen_name: row.screen_name,
            is_allowed: row.is_allowed,
        })
    }
}
