use axum::routing::get;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /                        -> list_orders          (orders:read@order-inquiry)
/// POST   /                        -> create_order         (orders:create@order-entry)
/// GET    /number/{order_number}   -> get_order_by_number  (orders:read@order-inquiry)
/// GET    /{id}                    -> get_order            (orders:read@order-inquiry)
/// PUT    /{id}                    -> update_order         (orders:update@order-correction)
/// DELETE /{id}                    -> delete_order         (orders:delete@order-cancellation)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route("/number/{order_number}", get(orders::get_order_by_number))
        .route(
            "/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
}
