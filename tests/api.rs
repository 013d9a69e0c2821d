//! End-to-end API tests over an in-memory database.
//!
//! Each test builds the full router against a fresh `sqlite::memory:` pool
//! (single connection, so every request sees the same database) and drives it
//! with `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cafeteria_server::AppState;
use cafeteria_server::api::create_router;
use cafeteria_server::config::{Config, UnknownItemPolicy};

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        db_max_connections: 1,
        http_port: 0,
        environment: "development".into(),
        jwt_secret: "integration-test-secret".into(),
        jwt_issuer: "cafeteria-server".into(),
        jwt_audience: "cafeteria-clients".into(),
        token_ttl_minutes: 60,
        unknown_item_policy: UnknownItemPolicy::Skip,
    }
}

async fn app_with(config: Config) -> (Router, AppState) {
    let state = AppState::new(&config).await.expect("state init");
    (create_router(state.clone()), state)
}

async fn app() -> Router {
    app_with(test_config()).await.0
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
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

/// Register a user and return the issued token.
async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().expect("token in response").to_owned()
}

/// Create an order from (menuItemId, quantity) pairs and return its id.
async fn create_order(app: &Router, token: &str, items: &[(i64, i64)]) -> i64 {
    let items: Vec<Value> = items
        .iter()
        .map(|(id, qty)| json!({ "menuItemId": id, "quantity": qty }))
        .collect();
    let (status, body) = send(
        app,
        "POST",
        "/orders",
        Some(token),
        Some(json!({ "items": items })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["orderId"].as_i64().expect("orderId in response")
}

async fn get_order(app: &Router, token: &str, order_id: i64) -> (StatusCode, Value) {
    send(app, "GET", &format!("/orders/{order_id}"), Some(token), None).await
}

// ── Public surface ──

#[tokio::test]
async fn health_and_menu_are_public() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/orders/menu", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let menu = body["menu"].as_array().unwrap();
    assert_eq!(menu.len(), 4);
    assert_eq!(menu[0]["name"], "Burger");
    assert_eq!(menu[0]["price"], 50);
}

// ── Registration ──

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = app().await;
    register(&app, "alice", "secret1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "another1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn register_validates_input() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "bob", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "   ", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Login ──

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app().await;
    register(&app, "alice", "secret1").await;

    let wrong_password = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong1" })),
    )
    .await;
    let unknown_user = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "secret1" })),
    )
    .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    // Same status, same body: no username enumeration
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn login_returns_identity_and_usable_token() {
    let app = app().await;
    register(&app, "alice", "secret1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["userId"].as_i64().is_some());

    let token = body["token"].as_str().unwrap();
    let (status, _) = send(&app, "GET", "/orders", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Token validation ──

#[tokio::test]
async fn orders_require_a_valid_token() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/orders", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    // Flip one character well inside the signature segment
    let mut tampered = token.into_bytes();
    let idx = tampered.len() - 10;
    tampered[idx] = if tampered[idx] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let (status, _) = send(&app, "GET", "/orders", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let mut config = test_config();
    config.token_ttl_minutes = -1;
    let (app, _) = app_with(config).await;

    let token = register(&app, "alice", "secret1").await;
    let (status, _) = send(&app, "GET", "/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    let (status, _) = send(&app, "GET", "/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Best-effort: logout without a token still acks
    let (status, _) = send(&app, "POST", "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Orders ──

#[tokio::test]
async fn create_order_snapshots_prices_and_skips_unknown_items() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    // Item 1 is Burger at 50; 999 does not exist and is silently dropped
    let order_id = create_order(&app, &token, &[(1, 2), (999, 1)]).await;

    let (status, body) = get_order(&app, &token, order_id).await;
    assert_eq!(status, StatusCode::OK);
    let order = &body["order"];
    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["menuItemId"], 1);
    assert_eq!(items[0]["itemName"], "Burger");
    assert_eq!(items[0]["price"], 50);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(order["totalPrice"], 100);
}

#[tokio::test]
async fn unknown_items_fail_the_request_under_reject_policy() {
    let mut config = test_config();
    config.unknown_item_policy = UnknownItemPolicy::Reject;
    let (app, _) = app_with(config).await;
    let token = register(&app, "alice", "secret1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(&token),
        Some(json!({ "items": [{ "menuItemId": 999, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown menu item id 999");
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(&token),
        Some(json!({ "items": [{ "menuItemId": 1, "quantity": 0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_quantity_is_rejected() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    // A quantity near i64::MAX / price must never reach the total computation
    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(&token),
        Some(json!({ "items": [{ "menuItemId": 1, "quantity": 1_844_674_407_370_955_161i64 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must be between 1 and 1000");

    // Same bound on the edit path
    let order_id = create_order(&app, &token, &[(1, 1)]).await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/orders/{order_id}"),
        Some(&token),
        Some(json!({ "items": [{ "menuItemId": 1, "quantity": 1_001 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The bound itself is accepted and the total stays exact
    let order_id = create_order(&app, &token, &[(4, 1_000)]).await;
    let (_, body) = get_order(&app, &token, order_id).await;
    assert_eq!(body["order"]["totalPrice"], 20_000);
}

#[tokio::test]
async fn order_with_only_unknown_items_is_created_empty() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    let order_id = create_order(&app, &token, &[(999, 1)]).await;

    let (status, body) = get_order(&app, &token, order_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["totalPrice"], 0);
    assert!(body["order"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn orders_list_is_most_recent_first() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    let first = create_order(&app, &token, &[(1, 1)]).await;
    let second = create_order(&app, &token, &[(2, 1)]).await;

    let (status, body) = send(&app, "GET", "/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"].as_i64().unwrap(), second);
    assert_eq!(orders[1]["id"].as_i64().unwrap(), first);
}

#[tokio::test]
async fn edit_replaces_the_item_set_and_recomputes_the_total() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    let order_id = create_order(&app, &token, &[(1, 2)]).await; // 100

    // Fries (30) + two Colas (20 each); 999 dropped; Burger gone entirely
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/orders/{order_id}"),
        Some(&token),
        Some(json!({ "items": [
            { "menuItemId": 2, "quantity": 1 },
            { "menuItemId": 4, "quantity": 2 },
            { "menuItemId": 999, "quantity": 1 },
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_order(&app, &token, order_id).await;
    let order = &body["order"];
    let ids: Vec<i64> = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["menuItemId"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 4]);
    assert_eq!(order["totalPrice"], 30 + 2 * 20);
}

#[tokio::test]
async fn missing_orders_yield_404() {
    let app = app().await;
    let token = register(&app, "alice", "secret1").await;

    let (status, _) = get_order(&app, &token, 12345).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/orders/12345",
        Some(&token),
        Some(json!({ "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/orders/12345", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn orders_are_invisible_to_other_users() {
    let app = app().await;
    let alice = register(&app, "alice", "secret1").await;
    let bob = register(&app, "bob", "secret2").await;

    let order_id = create_order(&app, &alice, &[(1, 1)]).await;

    let (status, _) = get_order(&app, &bob, order_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/orders/{order_id}"),
        Some(&bob),
        Some(json!({ "items": [{ "menuItemId": 2, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/orders/{order_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/orders", Some(&bob), None).await;
    assert!(body["orders"].as_array().unwrap().is_empty());

    // Alice's order survived Bob's attempts untouched
    let (status, body) = get_order(&app, &alice, order_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["totalPrice"], 50);
}

#[tokio::test]
async fn delete_removes_the_order_and_its_items() {
    let (app, state) = app_with(test_config()).await;
    let token = register(&app, "alice", "secret1").await;

    let order_id = create_order(&app, &token, &[(1, 1), (2, 1)]).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/orders/{order_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_order(&app, &token, order_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No orphaned line items remain
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
