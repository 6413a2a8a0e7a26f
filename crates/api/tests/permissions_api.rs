//! HTTP-level tests for screen-scoped authorization and grant management.

mod common;

use axum::http::StatusCode;
use bizdesk_db::models::customer::CreateCustomer;
use bizdesk_db::repositories::CustomerRepo;
use common::{create_user_with_token, delete_auth, expect_json, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

fn new_customer_body(code: &str) -> serde_json::Value {
    json!({ "customer_code": code, "name": format!("Customer {code}") })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn provisioned_user_is_denied_order_delete(pool: PgPool) {
    let (_, token) = create_user_with_token(&pool, "reader", "user").await;
    let app = common::build_test_app(pool);

    let json = expect_json(
        delete_auth(app, "/api/v1/orders/1", &token).await,
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn provisioned_user_can_read_orders(pool: PgPool) {
    let (_, token) = create_user_with_token(&pool, "reader", "user").await;
    let app = common::build_test_app(pool);

    let json = expect_json(get_auth(app, "/api/v1/orders", &token).await, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unauthenticated_requests_are_401_not_403(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/customers").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_grant_unlocks_a_screen(pool: PgPool) {
    let (_, admin_token) = create_user_with_token(&pool, "boss", "admin").await;
    let (user, user_token) = create_user_with_token(&pool, "clerk", "user").await;

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/customers", new_customer_body("C001"), &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let grant = json!({
        "entity_type": "customers",
        "operation_type": "create",
        "screen_name": "customer-register",
    });
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/permissions/grant", user.id),
        grant,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/customers", new_customer_body("C001"), &user_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_passes_with_no_grants(pool: PgPool) {
    let (admin, admin_token) = create_user_with_token(&pool, "boss", "admin").await;

    // Strip every grant from the admin; the role still passes.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/permissions", admin.id),
        json!({ "permissions": [] }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/customers", new_customer_body("C002"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replace_all_with_invalid_entry_keeps_prior_grants(pool: PgPool) {
    let (_, admin_token) = create_user_with_token(&pool, "boss", "admin").await;
    let (user, _) = create_user_with_token(&pool, "clerk", "user").await;
    let uri = format!("/api/v1/admin/users/{}/permissions", user.id);

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "permissions": [
            { "entity_type": "orders", "operation_type": "read", "screen_name": "order-inquiry" },
            { "entity_type": "orders", "operation_type": "delete", "screen_name": "" }
        ]
    });
    let response = put_json_auth(app, &uri, body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let json = expect_json(get_auth(app, &uri, &admin_token).await, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replace_all_swaps_the_grant_set(pool: PgPool) {
    let (_, admin_token) = create_user_with_token(&pool, "boss", "admin").await;
    let (user, user_token) = create_user_with_token(&pool, "clerk", "user").await;
    let customer = CustomerRepo::create(
        &pool,
        &CreateCustomer {
            customer_code: "C100".to_string(),
            name: "Acme".to_string(),
            email: None,
            phone: None,
            address: None,
        },
        None,
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "permissions": [
            { "entity_type": "customers", "operation_type": "delete", "screen_name": "customer-delete" }
        ]
    });
    let json = expect_json(
        put_json_auth(
            app,
            &format!("/api/v1/admin/users/{}/permissions", user.id),
            body,
            &admin_token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["is_allowed"], true);

    // Search access went away with the old set.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/customers", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response =
        delete_auth(app, &format!("/api/v1/customers/{}", customer.id), &user_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn grant_for_missing_user_is_404(pool: PgPool) {
    let (_, admin_token) = create_user_with_token(&pool, "boss", "admin").await;
    let app = common::build_test_app(pool);

    let grant = json!({
        "entity_type": "orders",
        "operation_type": "read",
        "screen_name": "order-inquiry",
    });
    let response = put_json_auth(
        app,
        "/api/v1/admin/users/999999/permissions/grant",
        grant,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn permission_matrix_projects_every_screen(pool: PgPool) {
    let (admin, admin_token) = create_user_with_token(&pool, "boss", "admin").await;
    let (user, _) = create_user_with_token(&pool, "clerk", "user").await;
    let app = common::build_test_app(pool);

    let json = expect_json(
        get_auth(app, "/api/v1/admin/permission-matrix", &admin_token).await,
        StatusCode::OK,
    )
    .await;
    let matrix = &json["data"];

    assert_eq!(matrix["screens"].as_array().unwrap().len(), 13);
    assert_eq!(matrix["users"].as_array().unwrap().len(), 2);

    let user_row = &matrix["permissions"][user.id.to_string()];
    assert_eq!(user_row["order-inquiry_read"], true);
    assert_eq!(user_row["order-cancellation_delete"], false);
    assert_eq!(user_row["product-register_create"], false);

    let admin_row = &matrix["permissions"][admin.id.to_string()];
    assert_eq!(admin_row["order-cancellation_delete"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn matrix_agrees_with_authorization_for_mismatched_entity(pool: PgPool) {
    let (_, admin_token) = create_user_with_token(&pool, "boss", "admin").await;
    let (user, user_token) = create_user_with_token(&pool, "clerk", "user").await;

    // Right screen and operation, wrong entity type.
    let app = common::build_test_app(pool.clone());
    let grant = json!({
        "entity_type": "customers",
        "operation_type": "delete",
        "screen_name": "order-cancellation",
    });
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/permissions/grant", user.id),
        grant,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, "/api/v1/orders/1", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let json = expect_json(
        get_auth(app, "/api/v1/admin/permission-matrix", &admin_token).await,
        StatusCode::OK,
    )
    .await;
    let user_row = &json["data"]["permissions"][user.id.to_string()];
    assert_eq!(user_row["order-cancellation_delete"], false);
}
