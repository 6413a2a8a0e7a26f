pub mod admin;
pub mod auth;
pub mod customers;
pub mod health;
pub mod orders;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                         register (public)
/// /auth/login                            login (public)
/// /auth/me                               current user (requires auth)
/// /auth/permissions                      own grants (requires auth)
///
/// /customers                             list, create
/// /customers/{id}                        get, update, delete
///
/// /products                              list, create
/// /products/{id}                         get, update, delete
///
/// /orders                                list, create
/// /orders/number/{order_number}          get by order number
/// /orders/{id}                           get, update, delete
///
/// /admin/users                           list, create (admin only)
/// /admin/users/{id}                      get, update, delete
/// /admin/users/{id}/permissions          list, replace all
/// /admin/users/{id}/permissions/grant    upsert one grant
/// /admin/permission-matrix               screens x users
/// ```
///
/// Customer, product, and order routes are guarded per handler by
/// `RequirePermission<_>` with a fixed screen-scoped key.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/customers", customers::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
