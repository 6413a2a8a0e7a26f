//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{admin, permissions};
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the `admin` role.
///
/// ```text
/// GET    /users                           -> list_users
/// POST   /users                           -> create_user
/// GET    /users/{id}                      -> get_user
/// PUT    /users/{id}                      -> update_user
/// DELETE /users/{id}                      -> delete_user
/// GET    /users/{id}/permissions          -> list_user_permissions
/// PUT    /users/{id}/permissions          -> replace_user_permissions
/// PUT    /users/{id}/permissions/grant    -> grant_permission
/// GET    /permission-matrix               -> permission_matrix
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route(
            "/users/{id}/permissions",
            get(permissions::list_user_permissions).put(permissions::replace_user_permissions),
        )
        .route(
            "/users/{id}/permissions/grant",
            put(permissions::grant_permission),
        )
        .route("/permission-matrix", get(permissions::permission_matrix))
}
