//! Handlers for per-user grants and the permission matrix.
//!
//! All handlers require the `admin` role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::matrix::{build_matrix, MatrixUser, PermissionMatrix};
use bizdesk_core::permissions::GrantSpec;
use bizdesk_core::screens::SCREENS;
use bizdesk_core::types::DbId;
use bizdesk_db::models::permission::PermissionGrant;
use bizdesk_db::repositories::{PermissionRepo, UserRepo};
use serde::Deserialize;

use super::admin::user_not_found;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/permissions`.
#[derive(Debug, Deserialize)]
pub struct ReplacePermissionsRequest {
    pub permissions: Vec<GrantSpec>,
}

/// GET /api/v1/admin/users/{id}/permissions
pub async fn list_user_permissions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PermissionGrant>>>> {
    ensure_user_exists(&state, user_id).await?;
    let grants = PermissionRepo::list_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: grants }))
}

/// PUT /api/v1/admin/users/{id}/permissions
///
/// Replace the user's whole grant set atomically. Returns the new set.
pub async fn replace_user_permissions(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<ReplacePermissionsRequest>,
) -> AppResult<Json<DataResponse<Vec<PermissionGrant>>>> {
    ensure_user_exists(&state, user_id).await?;
    PermissionRepo::replace_all(&state.pool, user_id, &input.permissions).await?;

    tracing::info!(
        user_id,
        grant_count = input.permissions.len(),
        changed_by = admin.user_id,
        "User permissions replaced"
    );

    let grants = PermissionRepo::list_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: grants }))
}

/// PUT /api/v1/admin/users/{id}/permissions/grant
///
/// Upsert a single grant. Returns 204 No Content.
pub async fn grant_permission(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<GrantSpec>,
) -> AppResult<StatusCode> {
    ensure_user_exists(&state, user_id).await?;
    PermissionRepo::grant(&state.pool, user_id, &input.key(), input.is_allowed).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/permission-matrix
///
/// Every screen against every user.
pub async fn permission_matrix(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<PermissionMatrix>>> {
    let users = UserRepo::list(&state.pool).await?;
    let users: Vec<MatrixUser> = users.iter().map(MatrixUser::from).collect();
    let grants = PermissionRepo::list_all(&state.pool).await?;

    Ok(Json(DataResponse {
        data: build_matrix(SCREENS, &users, &grants),
    }))
}

async fn ensure_user_exists(state: &AppState, user_id: DbId) -> AppResult<()> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .map(|_| ())
        .ok_or(user_not_found(user_id))
}
