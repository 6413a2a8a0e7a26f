//! Authorization decision.
//!
//! `authorize` answers one question: may this principal perform this
//! operation on this entity type through this screen? Administrators are
//! allowed unconditionally and never touch the grant store. Everyone else
//! needs an explicit allowed grant; a missing grant is a denial.
//!
//! The decision itself performs no writes, so callers evaluate it before any
//! mutating work and treat `Deny` as terminal for the request.

use async_trait::async_trait;
use serde::Serialize;

use crate::permissions::PermissionKey;
use crate::roles::is_admin;
use crate::types::DbId;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// The authenticated caller as supplied by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role: String,
}

impl Principal {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        is_admin(&self.role)
    }
}

/// Read side of the permission store.
///
/// `check` returns `Ok(false)` when no grant row exists; absence is never an
/// error.
#[async_trait]
pub trait GrantStore: Send + Sync {
    type Error: Send;

    async fn check(&self, user_id: DbId, key: &PermissionKey) -> Result<bool, Self::Error>;
}

/// Decide whether `principal` may act under `key`.
pub async fn authorize<S>(
    store: &S,
    principal: &Principal,
    key: &PermissionKey,
) -> Result<Decision, S::Error>
where
    S: GrantStore + ?Sized,
{
    if principal.is_admin() {
        return Ok(Decision::Allow);
    }

    let allowed = store.check(principal.user_id, key).await?;
    Ok(Decision::from(allowed))
}
