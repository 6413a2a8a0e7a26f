//! Bearer-token authentication for bizdesk handlers.
//!
//! [`AuthUser`] only proves who is calling. Whether they may touch a screen is
//! decided by [`RequirePermission`](super::permission::RequirePermission).

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bizdesk_core::authz::Principal;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a valid access token.
///
/// ```ignore
/// // GET /api/v1/auth/me
/// async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<...> {
///     let user = UserRepo::find_by_id(&state.pool, auth_user.user_id).await?;
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `users.id`, taken from `claims.sub`.
    pub user_id: DbId,
    /// Role carried in the token; admins bypass screen grants.
    pub role: String,
}

impl AuthUser {
    /// The identity `authorize` evaluates grants for.
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role.clone())
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// Pull the raw token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Malformed Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
