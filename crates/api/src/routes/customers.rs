use axum::routing::get;
use axum::Router;

use crate::handlers::customers;
use crate::state::AppState;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /       -> list_customers   (customers:read@customer-search)
/// POST   /       -> create_customer  (customers:create@customer-register)
/// GET    /{id}   -> get_customer     (customers:read@customer-search)
/// PUT    /{id}   -> update_customer  (customers:update@customer-edit)
/// DELETE /{id}   -> delete_customer  (customers:delete@customer-delete)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
}
