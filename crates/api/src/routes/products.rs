use axum::routing::get;
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /       -> list_products   (products:read@product-search)
/// POST   /       -> create_product  (products:create@product-register)
/// GET    /{id}   -> get_product     (products:read@product-search)
/// PUT    /{id}   -> update_product  (products:update@product-update)
/// DELETE /{id}   -> delete_product  (products:delete@product-delete)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
}
