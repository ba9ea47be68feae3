//! End-to-end tests over the full router with an in-memory database.
//!
//! Requests are driven straight through the tower service; no socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use market_api::auth::JwtManager;
use market_api::{router, AppState};
use market_db::{Database, DbConfig, NewProduct, NewVariant, OrderNoGenerator, WallClockOrderNo};

async fn test_state() -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState {
        db,
        jwt: Arc::new(JwtManager::new("test-secret", 3600)),
        order_no: Arc::new(WallClockOrderNo::default()),
        order_no_attempts: 5,
    }
}

/// Seeds product A (100, simple) and product B (200, variant "red" 150);
/// returns (a_id, b_id, red_id).
async fn seed_catalog(state: &AppState) -> (i64, i64, i64) {
    let products = state.db.products();

    let a = products
        .create(NewProduct {
            name: "A".to_string(),
            price_cents: 100,
            is_active: true,
            image_url: String::new(),
            description: String::new(),
            tag_names: vec!["fruit".to_string()],
            variants: vec![],
        })
        .await
        .unwrap();

    let b = products
        .create(NewProduct {
            name: "B".to_string(),
            price_cents: 200,
            is_active: true,
            image_url: String::new(),
            description: String::new(),
            tag_names: vec![],
            variants: vec![NewVariant {
                name: "red".to_string(),
                price_cents: 150,
                image_url: String::new(),
                is_active: true,
                sort_order: 0,
            }],
        })
        .await
        .unwrap();

    (a.product.id, b.product.id, b.variants[0].id)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn order_body(items: Value) -> Value {
    json!({
        "customer_name": "Ann",
        "customer_phone": "0912345678",
        "pickup_store_address": "7-11 Main St",
        "items": items,
    })
}

#[tokio::test]
async fn test_health() {
    let state = test_state().await;
    let app = router(state);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_order_create_happy_path() {
    let state = test_state().await;
    let (a, b, red) = seed_catalog(&state).await;
    let app = router(state);

    let items = json!([
        {"product_id": a, "quantity": 2},
        {"product_id": b, "quantity": 1, "variant_id": red},
    ]);
    let (status, body) = send(&app, "POST", "/api/orders/create", None, Some(order_body(items))).await;

    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    assert_eq!(body["total_cents"], 350);
    assert_eq!(body["status"], "NEW");

    // PREFIX-YYYYMMDD-HHMMSS-RRRR
    let order_no = body["order_no"].as_str().unwrap();
    let parts: Vec<&str> = order_no.split('-').collect();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], "MKT");
    assert_eq!((parts[1].len(), parts[2].len(), parts[3].len()), (8, 6, 4));

    // Snapshot items
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product_name_snapshot"], "A");
    assert_eq!(items[0]["unit_price_cents"], 100);
    assert_eq!(items[0]["line_total_cents"], 200);
    assert_eq!(items[1]["product_name_snapshot"], "B - red");
    assert_eq!(items[1]["line_total_cents"], 150);

    // Payment/contact extras
    assert_eq!(body["transfer"]["amount"], 350);
    assert_eq!(body["line"]["oa_id"], "@032emqnn");
    assert_eq!(body["line"]["chat_url"], "https://line.me/R/ti/p/@032emqnn");
    assert_eq!(body["line"]["add_friend_url"], body["line"]["chat_url"]);

    // Readable back through the public surface
    let (status, fetched) = send(&app, "GET", &format!("/api/orders/{order_no}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total_cents"], 350);

    let (status, listed) = send(&app, "GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_create_rejects_empty_items() {
    let state = test_state().await;
    seed_catalog(&state).await;
    let app = router(state);

    let (status, body) =
        send(&app, "POST", "/api/orders/create", None, Some(order_body(json!([])))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_order_create_rejects_bad_quantity() {
    let state = test_state().await;
    let (a, _, _) = seed_catalog(&state).await;
    let app = router(state);

    for quantity in [0, 1000] {
        let items = json!([{"product_id": a, "quantity": quantity}]);
        let (status, _) =
            send(&app, "POST", "/api/orders/create", None, Some(order_body(items))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_order_create_rejects_missing_products() {
    let state = test_state().await;
    let (a, _, _) = seed_catalog(&state).await;
    let app = router(state.clone());

    let items = json!([{"product_id": a, "quantity": 1}, {"product_id": 9999, "quantity": 1}]);
    let (status, body) =
        send(&app, "POST", "/api/orders/create", None, Some(order_body(items))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("9999"));

    // Nothing was persisted
    assert!(state.db.orders().list(None).await.unwrap().is_empty());
}

/// Generator that always returns the same number, to force collisions.
struct FixedOrderNo;

impl OrderNoGenerator for FixedOrderNo {
    fn generate(&self) -> String {
        "MKT-20260807-120000-1234".to_string()
    }
}

#[tokio::test]
async fn test_order_number_exhaustion_is_500() {
    let mut state = test_state().await;
    state.order_no = Arc::new(FixedOrderNo);
    let (a, _, _) = seed_catalog(&state).await;
    let app = router(state);

    let items = json!([{"product_id": a, "quantity": 1}]);

    let (status, _) =
        send(&app, "POST", "/api/orders/create", None, Some(order_body(items.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        send(&app, "POST", "/api/orders/create", None, Some(order_body(items))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let state = test_state().await;
    let app = router(state);

    let (status, _) = send(&app, "GET", "/api/admin/settings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/admin/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_login_flow() {
    let state = test_state().await;
    state
        .db
        .admin_users()
        .create("boss", "s3cret-password")
        .await
        .unwrap();
    let app = router(state);

    // Wrong password
    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({"username": "boss", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct credentials
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({"username": "boss", "password": "s3cret-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "boss");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/admin/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["username"], "boss");
}

#[tokio::test]
async fn test_admin_order_status_update() {
    let state = test_state().await;
    let (a, _, _) = seed_catalog(&state).await;
    let token = state.jwt.generate_token("boss").unwrap();
    let app = router(state);

    let items = json!([{"product_id": a, "quantity": 1}]);
    let (_, created) =
        send(&app, "POST", "/api/orders/create", None, Some(order_body(items))).await;
    let order_no = created["order_no"].as_str().unwrap();

    // No token
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/admin/orders/{order_no}"),
        None,
        Some(json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Invalid value leaves the order untouched
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/admin/orders/{order_no}"),
        Some(&token),
        Some(json!({"status": "SHIPPED"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = send(&app, "GET", &format!("/api/orders/{order_no}"), None, None).await;
    assert_eq!(fetched["status"], "NEW");

    // Valid update
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/admin/orders/{order_no}"),
        Some(&token),
        Some(json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    // Unknown order
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/admin/orders/MKT-00000000-000000-0000",
        Some(&token),
        Some(json!({"status": "CONFIRMED"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_update_is_visible_immediately() {
    let state = test_state().await;
    let (a, _, _) = seed_catalog(&state).await;
    let token = state.jwt.generate_token("boss").unwrap();
    let app = router(state);

    // Prime the cache
    let (status, body) = send(&app, "GET", "/api/admin/settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bank_account"], "");

    // Partial update
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/admin/settings",
        Some(&token),
        Some(json!({"bank_account": "123-456-789", "bank_name_code": "812"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bank_account"], "123-456-789");
    assert_eq!(body["line_oa_id"], "@032emqnn");

    // The next read reflects the change (cache was invalidated)
    let (_, body) = send(&app, "GET", "/api/admin/settings", Some(&token), None).await;
    assert_eq!(body["bank_account"], "123-456-789");

    // And so do order extras on the public surface
    let items = json!([{"product_id": a, "quantity": 1}]);
    let (_, created) =
        send(&app, "POST", "/api/orders/create", None, Some(order_body(items))).await;
    assert_eq!(created["transfer"]["bank_account"], "123-456-789");
    assert_eq!(created["transfer"]["bank_name_code"], "812");
}

#[tokio::test]
async fn test_product_listing_filters() {
    let state = test_state().await;
    seed_catalog(&state).await;

    // An inactive product is invisible publicly
    state
        .db
        .products()
        .create(NewProduct {
            name: "Hidden".to_string(),
            price_cents: 10,
            is_active: false,
            image_url: String::new(),
            description: String::new(),
            tag_names: vec![],
            variants: vec![],
        })
        .await
        .unwrap();

    let token = state.jwt.generate_token("boss").unwrap();
    let app = router(state);

    let (status, body) = send(&app, "GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // has_variants is derived from the variant list
    let b = body
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "B")
        .unwrap();
    assert_eq!(b["has_variants"], true);
    assert_eq!(b["variants"][0]["name"], "red");

    // Tag filter
    let (_, body) = send(&app, "GET", "/api/products?tags=fruit", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "A");

    // Admin sees the inactive product too
    let (_, body) = send(&app, "GET", "/api/admin/products", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_public_product_detail_hides_inactive() {
    let state = test_state().await;
    let (a, _, _) = seed_catalog(&state).await;

    state
        .db
        .products()
        .update(
            a,
            market_db::ProductUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let app = router(state);

    let (status, _) = send(&app, "GET", &format!("/api/products/{a}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
