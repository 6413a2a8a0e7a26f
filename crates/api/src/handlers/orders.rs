//! Handlers for the `/orders` resource.
//!
//! Referenced customers and products are checked up front so a bad id is a
//! 400 with a readable message instead of a foreign-key failure mid-transaction.
//! The foreign keys still back this up.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::error::CoreError;
use bizdesk_core::order::OrderItemInput;
use bizdesk_core::types::DbId;
use bizdesk_db::models::order::{CreateOrder, OrderDetail, OrderFilters, OrderPage, UpdateOrder};
use bizdesk_db::repositories::{CustomerRepo, OrderRepo, ProductRepo};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::middleware::permission::{
    OrderCancellationDelete, OrderCorrectionUpdate, OrderEntryCreate, OrderInquiryRead,
    RequirePermission,
};
use crate::query::OrderListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/orders?customer_id=&status=&order_number=&limit=&offset=
///
/// Newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    _guard: RequirePermission<OrderInquiryRead>,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<DataResponse<OrderPage>>> {
    let (limit, offset) = params.page();
    let filters = OrderFilters {
        customer_id: params.customer_id,
        status: params.status,
        order_number: params.order_number,
    };

    let page = OrderRepo::list(&state.pool, &filters, limit, offset).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    _guard: RequirePermission<OrderInquiryRead>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(order_not_found(id))?;
    Ok(Json(DataResponse { data: order }))
}

/// GET /api/v1/orders/number/{order_number}
pub async fn get_order_by_number(
    State(state): State<AppState>,
    _guard: RequirePermission<OrderInquiryRead>,
    Path(order_number): Path<String>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = OrderRepo::find_by_order_number(&state.pool, &order_number)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    Ok(Json(DataResponse { data: order }))
}

/// POST /api/v1/orders
///
/// The order date, order number, subtotals, and total are always computed
/// server-side.
pub async fn create_order(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<OrderEntryCreate>,
    Json(input): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderDetail>>)> {
    ensure_customer_exists(&state, input.customer_id).await?;
    ensure_products_exist(&state, &input.items).await?;

    let order_date = Utc::now().date_naive();
    let order = OrderRepo::create(&state.pool, &input, order_date, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// PUT /api/v1/orders/{id}
///
/// Status moves one step along the lifecycle; skipped or backward moves are
/// 409. Supplied items replace the existing ones and the total is recomputed.
pub async fn update_order(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<OrderCorrectionUpdate>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrder>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    if let Some(customer_id) = input.customer_id {
        ensure_customer_exists(&state, customer_id).await?;
    }
    if let Some(items) = &input.items {
        ensure_products_exist(&state, items).await?;
    }

    let order = OrderRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(order_not_found(id))?;
    tracing::info!(order_id = id, user_id = user.user_id, "Order updated via API");
    Ok(Json(DataResponse { data: order }))
}

/// DELETE /api/v1/orders/{id}
///
/// Items are removed with the order.
pub async fn delete_order(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<OrderCancellationDelete>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !OrderRepo::delete(&state.pool, id).await? {
        return Err(order_not_found(id));
    }
    tracing::info!(order_id = id, user_id = user.user_id, "Order deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn order_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Order", id })
}

async fn ensure_customer_exists(state: &AppState, customer_id: DbId) -> AppResult<()> {
    if CustomerRepo::find_by_id(&state.pool, customer_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Customer {customer_id} does not exist"
        ))));
    }
    Ok(())
}

async fn ensure_products_exist(state: &AppState, items: &[OrderItemInput]) -> AppResult<()> {
    let ids: Vec<DbId> = items.iter().map(|item| item.product_id).collect();
    let missing = ProductRepo::find_missing_ids(&state.pool, &ids).await?;
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown product ids: {missing:?}"
        ))));
    }
    Ok(())
}
