//! HTTP-level tests for the order aggregate.

mod common;

use axum::http::StatusCode;
use bizdesk_core::order::format_order_number;
use bizdesk_core::types::DbId;
use bizdesk_db::models::customer::CreateCustomer;
use bizdesk_db::models::product::CreateProduct;
use bizdesk_db::repositories::{CustomerRepo, ProductRepo};
use common::{create_user_with_token, delete_auth, expect_json, get_auth, post_json_auth, put_json_auth};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

struct Fixture {
    token: String,
    customer_id: DbId,
    laptop_id: DbId,
    mouse_id: DbId,
}

async fn setup(pool: &PgPool) -> Fixture {
    let (_, token) = create_user_with_token(pool, "boss", "admin").await;
    let customer = CustomerRepo::create(
        pool,
        &CreateCustomer {
            customer_code: "C001".to_string(),
            name: "Acme".to_string(),
            email: Some("buyer@acme.test".to_string()),
            phone: None,
            address: None,
        },
        None,
    )
    .await
    .unwrap();

    let mut product_ids = Vec::new();
    for (code, price) in [("P001", 120_000), ("P003", 25_000)] {
        let product = ProductRepo::create(
            pool,
            &CreateProduct {
                product_code: code.to_string(),
                name: format!("Product {code}"),
                description: None,
                price,
                stock_quantity: Some(10),
                category: None,
            },
            None,
        )
        .await
        .unwrap();
        product_ids.push(product.id);
    }

    Fixture {
        token,
        customer_id: customer.id,
        laptop_id: product_ids[0],
        mouse_id: product_ids[1],
    }
}

fn order_body(f: &Fixture) -> serde_json::Value {
    json!({
        "customer_id": f.customer_id,
        "items": [
            { "product_id": f.laptop_id, "quantity": 5, "unit_price": 120000 },
            { "product_id": f.mouse_id, "quantity": 5, "unit_price": 25000 }
        ]
    })
}

/// The order number the server assigns for today's `sequence`th order.
fn todays_number(sequence: i32) -> String {
    format_order_number(Utc::now().date_naive(), sequence)
}

async fn count_orders(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_computes_number_subtotals_and_total(pool: PgPool) {
    let f = setup(&pool).await;
    let app = common::build_test_app(pool);

    let mut body = order_body(&f);
    // Client-supplied totals, numbers, and dates are ignored.
    body["total_amount"] = json!(1);
    body["order_number"] = json!("ORD19990101999");
    body["order_date"] = json!("+10000-01-01");

    let json = expect_json(
        post_json_auth(app, "/api/v1/orders", body, &f.token).await,
        StatusCode::CREATED,
    )
    .await;
    let order = &json["data"];

    assert_eq!(order["order_number"], todays_number(1));
    assert_eq!(order["order_date"], Utc::now().date_naive().to_string());
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], 725_000);
    assert_eq!(order["customer_code"], "C001");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["items"][0]["subtotal"], 600_000);
    assert_eq!(order["items"][1]["subtotal"], 125_000);
    assert_eq!(order["items"][1]["product_code"], "P003");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn same_day_orders_get_consecutive_numbers(pool: PgPool) {
    let f = setup(&pool).await;

    for expected in [todays_number(1), todays_number(2), todays_number(3)] {
        let app = common::build_test_app(pool.clone());
        let json = expect_json(
            post_json_auth(app, "/api/v1/orders", order_body(&f), &f.token).await,
            StatusCode::CREATED,
        )
        .await;
        assert_eq!(json["data"]["order_number"], expected);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_product_is_rejected_without_writing(pool: PgPool) {
    let f = setup(&pool).await;
    let app = common::build_test_app(pool.clone());

    let body = json!({
        "customer_id": f.customer_id,
        "items": [
            { "product_id": f.laptop_id, "quantity": 1, "unit_price": 120000 },
            { "product_id": 999999, "quantity": 1, "unit_price": 1 }
        ]
    });
    let json = expect_json(
        post_json_auth(app, "/api/v1/orders", body, &f.token).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(count_orders(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_customer_and_empty_items_are_400(pool: PgPool) {
    let f = setup(&pool).await;

    let app = common::build_test_app(pool.clone());
    let mut body = order_body(&f);
    body["customer_id"] = json!(999999);
    let response = post_json_auth(app, "/api/v1/orders", body, &f.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "customer_id": f.customer_id, "items": [] });
    let response = post_json_auth(app, "/api/v1/orders", body, &f.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(count_orders(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_moves_one_step_at_a_time(pool: PgPool) {
    let f = setup(&pool).await;
    let app = common::build_test_app(pool.clone());
    let created = expect_json(
        post_json_auth(app, "/api/v1/orders", order_body(&f), &f.token).await,
        StatusCode::CREATED,
    )
    .await;
    let uri = format!("/api/v1/orders/{}", created["data"]["id"]);

    let app = common::build_test_app(pool.clone());
    let json = expect_json(
        put_json_auth(app, &uri, json!({ "status": "delivered" }), &f.token).await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(json["code"], "CONFLICT");

    let app = common::build_test_app(pool.clone());
    let json = expect_json(
        put_json_auth(app, &uri, json!({ "status": "confirmed" }), &f.token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["status"], "confirmed");

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, json!({ "status": "teleported" }), &f.token).await;
    assert!(response.status().is_client_error());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replacing_items_recomputes_total(pool: PgPool) {
    let f = setup(&pool).await;
    let app = common::build_test_app(pool.clone());
    let created = expect_json(
        post_json_auth(app, "/api/v1/orders", order_body(&f), &f.token).await,
        StatusCode::CREATED,
    )
    .await;
    let uri = format!("/api/v1/orders/{}", created["data"]["id"]);

    let app = common::build_test_app(pool);
    let body = json!({
        "items": [{ "product_id": f.mouse_id, "quantity": 2, "unit_price": 30000 }]
    });
    let json = expect_json(put_json_auth(app, &uri, body, &f.token).await, StatusCode::OK).await;

    assert_eq!(json["data"]["total_amount"], 60_000);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["order_number"], todays_number(1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_by_number_list_and_delete(pool: PgPool) {
    let f = setup(&pool).await;
    let app = common::build_test_app(pool.clone());
    let created = expect_json(
        post_json_auth(app, "/api/v1/orders", order_body(&f), &f.token).await,
        StatusCode::CREATED,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let json = expect_json(
        get_auth(app, &format!("/api/v1/orders/number/{}", todays_number(1)), &f.token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["id"], id);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/orders/number/ORD19990101001", &f.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let json = expect_json(
        get_auth(app, "/api/v1/orders?status=pending&limit=5", &f.token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["limit"], 5);

    let app = common::build_test_app(pool.clone());
    let json = expect_json(
        get_auth(app, "/api/v1/orders?status=shipped", &f.token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["total"], 0);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/orders/{id}"), &f.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/orders/{id}"), &f.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(items, 0);
}
