//! Admin gate for user and grant management.
//!
//! Business screens go through `RequirePermission`; only the `/admin` routes
//! are gated on role alone.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bizdesk_core::error::CoreError;
use bizdesk_core::roles::is_admin;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller holding the `admin` role; anyone else gets 403.
///
/// ```ignore
/// // PUT /api/v1/admin/users/{id}/permissions
/// async fn replace_user_permissions(RequireAdmin(admin): RequireAdmin, ...) { ... }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if is_admin(&user.role) {
            return Ok(RequireAdmin(user));
        }
        tracing::warn!(
            user_id = user.user_id,
            role = %user.role,
            path = %parts.uri.path(),
            "Non-admin denied admin route"
        );
        Err(AppError::Core(CoreError::Forbidden(
            "Admin role required".into(),
        )))
    }
}
