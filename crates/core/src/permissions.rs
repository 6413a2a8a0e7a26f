//! Permission vocabulary: entity types, operation types, and grant tuples.
//!
//! A grant is keyed by `(user, entity type, operation type, screen name)`.
//! Screen names are free-form labels, but they may never be empty.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of a screen name label (characters).
pub const MAX_SCREEN_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Entity type
// ---------------------------------------------------------------------------

/// Business entity a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Customers,
    Products,
    Orders,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [Self::Customers, Self::Products, Self::Orders];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Orders => "orders",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid entity type '{s}'. Must be one of: customers, products, orders"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Operation type
// ---------------------------------------------------------------------------

/// Kind of operation a permission allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Create,
    Read,
    Update,
    Delete,
}

impl OperationType {
    pub const ALL: [OperationType; 4] = [Self::Create, Self::Read, Self::Update, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid operation type '{s}'. Must be one of: create, read, update, delete"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Keys and grants
// ---------------------------------------------------------------------------

/// What a request needs: an operation on an entity type through a screen.
///
/// Route guards build these from `'static` constants, so the screen name is a
/// `Cow` to avoid allocating on every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionKey {
    pub entity_type: EntityType,
    pub operation_type: OperationType,
    pub screen_name: Cow<'static, str>,
}

impl PermissionKey {
    pub fn new(
        entity_type: EntityType,
        operation_type: OperationType,
        screen_name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            entity_type,
            operation_type,
            screen_name: screen_name.into(),
        }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}",
            self.entity_type, self.operation_type, self.screen_name
        )
    }
}

/// One grant as supplied to a bulk replace or read from a role grant table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSpec {
    pub entity_type: EntityType,
    pub operation_type: OperationType,
    pub screen_name: String,
    #[serde(default = "default_allowed")]
    pub is_allowed: bool,
}

fn default_allowed() -> bool {
    true
}

impl GrantSpec {
    /// Shorthand for an allowed grant.
    pub fn allow(
        entity_type: EntityType,
        operation_type: OperationType,
        screen_name: &str,
    ) -> Self {
        Self {
            entity_type,
            operation_type,
            screen_name: screen_name.to_string(),
            is_allowed: true,
        }
    }

    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(
            self.entity_type,
            self.operation_type,
            self.screen_name.clone(),
        )
    }
}

/// A grant as it exists in storage, bound to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGrant {
    pub user_id: DbId,
    pub entity_type: EntityType,
    pub operation_type: OperationType,
    pub screen_name: String,
    pub is_allowed: bool,
}

/// Validate a screen name label.
pub fn validate_screen_name(screen_name: &str) -> Result<(), CoreError> {
    if screen_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Screen name must not be empty".to_string(),
        ));
    }
    if screen_name.chars().count() > MAX_SCREEN_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Screen name exceeds maximum length of {MAX_SCREEN_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate every grant in a replacement set.
pub fn validate_grants(grants: &[GrantSpec]) -> Result<(), CoreError> {
    grants
        .iter()
        .try_for_each(|g| validate_screen_name(&g.screen_name))
}
