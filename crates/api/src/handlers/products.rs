//! Handlers for the `/products` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::catalog::{validate_code, validate_name, validate_price, validate_stock_quantity};
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use bizdesk_db::models::product::{CreateProduct, Product, UpdateProduct};
use bizdesk_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::permission::{
    ProductDeleteDelete, ProductRegisterCreate, ProductSearchRead, ProductUpdateUpdate,
    RequirePermission,
};
use crate::query::SearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/products?q=&category=&limit=&offset=
pub async fn list_products(
    State(state): State<AppState>,
    _guard: RequirePermission<ProductSearchRead>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<PageResponse<Product>>>> {
    let (limit, offset) = params.page();
    let search = params.q.as_deref();
    let category = params.category.as_deref();

    let items = ProductRepo::list(&state.pool, search, category, limit, offset).await?;
    let total = ProductRepo::count(&state.pool, search, category).await?;

    Ok(Json(DataResponse {
        data: PageResponse {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    _guard: RequirePermission<ProductSearchRead>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(product_not_found(id))?;
    Ok(Json(DataResponse { data: product }))
}

/// POST /api/v1/products
pub async fn create_product(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<ProductRegisterCreate>,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    validate_code("product_code", &input.product_code)?;
    validate_name(&input.name)?;
    validate_price(input.price)?;
    if let Some(quantity) = input.stock_quantity {
        validate_stock_quantity(quantity)?;
    }

    let product = ProductRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(
        product_id = product.id,
        product_code = %product.product_code,
        user_id = user.user_id,
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// PUT /api/v1/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<ProductUpdateUpdate>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    if let Some(code) = &input.product_code {
        validate_code("product_code", code)?;
    }
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    if let Some(quantity) = input.stock_quantity {
        validate_stock_quantity(quantity)?;
    }

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(product_not_found(id))?;
    tracing::info!(product_id = id, user_id = user.user_id, "Product updated");
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/products/{id}
///
/// Products referenced by order items cannot be deleted (409).
pub async fn delete_product(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<ProductDeleteDelete>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProductRepo::delete(&state.pool, id).await? {
        return Err(product_not_found(id));
    }
    tracing::info!(product_id = id, user_id = user.user_id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn product_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}
