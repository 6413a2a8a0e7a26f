//! Handlers for the `/customers` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::catalog::{validate_code, validate_email, validate_name};
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use bizdesk_db::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use bizdesk_db::repositories::CustomerRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::permission::{
    CustomerDeleteDelete, CustomerEditUpdate, CustomerRegisterCreate, CustomerSearchRead,
    RequirePermission,
};
use crate::query::SearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/customers?q=&limit=&offset=
pub async fn list_customers(
    State(state): State<AppState>,
    _guard: RequirePermission<CustomerSearchRead>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<PageResponse<Customer>>>> {
    let (limit, offset) = params.page();
    let search = params.q.as_deref();

    let items = CustomerRepo::list(&state.pool, search, limit, offset).await?;
    let total = CustomerRepo::count(&state.pool, search).await?;

    Ok(Json(DataResponse {
        data: PageResponse {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    _guard: RequirePermission<CustomerSearchRead>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Customer>>> {
    let customer = CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(customer_not_found(id))?;
    Ok(Json(DataResponse { data: customer }))
}

/// POST /api/v1/customers
///
/// Duplicate customer codes are rejected with 409.
pub async fn create_customer(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<CustomerRegisterCreate>,
    Json(input): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<DataResponse<Customer>>)> {
    validate_code("customer_code", &input.customer_code)?;
    validate_name(&input.name)?;
    if let Some(email) = &input.email {
        validate_email(email)?;
    }

    let customer = CustomerRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(
        customer_id = customer.id,
        customer_code = %customer.customer_code,
        user_id = user.user_id,
        "Customer created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: customer })))
}

/// PUT /api/v1/customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<CustomerEditUpdate>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<Json<DataResponse<Customer>>> {
    if let Some(code) = &input.customer_code {
        validate_code("customer_code", code)?;
    }
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(email) = &input.email {
        validate_email(email)?;
    }

    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(customer_not_found(id))?;
    tracing::info!(customer_id = id, user_id = user.user_id, "Customer updated");
    Ok(Json(DataResponse { data: customer }))
}

/// DELETE /api/v1/customers/{id}
///
/// Customers with orders cannot be deleted (409).
pub async fn delete_customer(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<CustomerDeleteDelete>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CustomerRepo::delete(&state.pool, id).await? {
        return Err(customer_not_found(id));
    }
    tracing::info!(customer_id = id, user_id = user.user_id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn customer_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Customer",
        id,
    })
}
