//! End-to-end HTTP tests against an in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use mars_storefront::admin::{AdminAuth, AdminClaims};
use mars_storefront::catalog::CatalogService;
use mars_storefront::chat::{ChatCompletion, ChatTurn};
use mars_storefront::config::AdminConfig;
use mars_storefront::db::Database;
use mars_storefront::error::StoreResult;
use mars_storefront::gateway::{build_router, state::AppState};

const ADMIN_ID: &str = "MARSDEMON";
const ADMIN_PASSWORD: &str = "integration-secret";
const JWT_SECRET: &str = "integration-jwt-secret";

/// Echoes the message and how many turns it was given
struct EchoChat;

#[async_trait]
impl ChatCompletion for EchoChat {
    async fn reply(&self, message: &str, history: &[ChatTurn]) -> StoreResult<String> {
        Ok(format!("{} ({} turns)", message, history.len()))
    }
}

async fn app_with_chat(chat: Option<Arc<dyn ChatCompletion>>) -> Router {
    let db = Database::connect_in_memory().await.unwrap();
    db.migrate().await.unwrap();
    CatalogService::new(db.pool().clone())
        .seed_defaults()
        .await
        .unwrap();

    let admin = AdminAuth::from_config(&AdminConfig {
        admin_id: ADMIN_ID.to_string(),
        password_hash: None,
        password: Some(ADMIN_PASSWORD.to_string()),
        jwt_secret: JWT_SECRET.to_string(),
        session_ttl_secs: 600,
    })
    .unwrap();

    build_router(Arc::new(AppState::new(Arc::new(db), admin, chat)))
}

async fn app() -> Router {
    app_with_chat(None).await
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
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
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/admin/login",
        Some(json!({"adminId": ADMIN_ID, "password": ADMIN_PASSWORD})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn seven_day_pack(app: &Router) -> i64 {
    let (_, services) = send(app, Method::GET, "/api/services", None, None).await;
    services
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "7 Day Pack")
        .map(|s| s["id"].as_i64().unwrap())
        .unwrap()
}

async fn place_order(app: &Router, body: Value) -> String {
    let (status, resp) = send(app, Method::POST, "/api/orders", Some(body), None).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    resp["orderId"].as_str().unwrap().to_string()
}

fn forged_token(secret: &str, role: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = AdminClaims {
        sub: ADMIN_ID.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + exp_offset_secs,
        jti: "test".to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_catalog_is_seeded() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["name"], "1 Day Pack");
    assert_eq!(items[0]["price"], 100);
}

#[tokio::test]
async fn test_register_login_and_duplicate() {
    let app = app().await;
    let creds = json!({"email": "Player@Example.com", "password": "password123"});

    let (status, body) = send(&app, Method::POST, "/api/auth/register", Some(creds.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let user_id = body["userId"].as_i64().unwrap();

    let (status, body) = send(&app, Method::POST, "/api/auth/register", Some(creds.clone()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");

    let (status, body) = send(&app, Method::POST, "/api/auth/login", Some(creds), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id);
    assert_eq!(body["user"]["email"], "player@example.com");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"email": "player@example.com", "password": "wrong-password"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_register_validation() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"email": "not-an-email", "password": "password123"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"email": "a@b.co"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_scenario() {
    let app = app().await;
    let token = admin_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/services",
        Some(json!({"name": "Weekend Pack", "price": 250, "duration": "2 Days"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let service_id = body["service"]["id"].as_i64().unwrap();

    let order_id = place_order(
        &app,
        json!({"telegramId": "@x", "serviceId": service_id.to_string(), "amount": "250"}),
    )
    .await;
    assert!(order_id.starts_with("MARS-"));

    let (_, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["amount"], 250);
    assert_eq!(order["service_name"], "Weekend Pack");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": order_id, "utr": "UTR123"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(order["status"], "processing");
    assert_eq!(order["utr"], "UTR123");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/orders/{order_id}"),
        Some(json!({"status": "completed"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(order["status"], "completed");
    assert_eq!(order["utr"], "UTR123");
    assert_eq!(order["telegram_id"], "@x");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": order_id, "utr": "LATE"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, history) = send(
        &app,
        Method::GET,
        &format!("/api/admin/orders/{order_id}/history"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["from_status"], "processing");
    assert_eq!(history[0]["to_status"], "completed");
    assert_eq!(history[0]["actor"], ADMIN_ID);
}

#[tokio::test]
async fn test_create_order_rejections() {
    let app = app().await;
    let service_id = seven_day_pack(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({"telegramId": "@x", "serviceId": 9999, "amount": 400})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REFERENCE_ERROR");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({"telegramId": "@x", "serviceId": service_id, "amount": 1})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({"telegramId": "", "serviceId": service_id, "amount": 400})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({"telegramId": "@x", "serviceId": "two", "amount": 400})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({"telegramId": "@x", "serviceId": service_id, "amount": 400, "userId": 777})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "REFERENCE_ERROR");

    let token = admin_token(&app).await;
    let (_, all) = send(&app, Method::GET, "/api/admin/orders", None, Some(&token)).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_user_order_listing() {
    let app = app().await;
    let service_id = seven_day_pack(&app).await;
    let (_, reg) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"email": "buyer@example.com", "password": "password123"})),
        None,
    )
    .await;
    let user_id = reg["userId"].as_i64().unwrap();

    let first = place_order(
        &app,
        json!({"telegramId": "@a", "serviceId": service_id, "amount": 400, "userId": user_id}),
    )
    .await;
    let second = place_order(
        &app,
        json!({"telegramId": "@b", "serviceId": service_id, "amount": 400, "userId": user_id}),
    )
    .await;
    place_order(&app, json!({"telegramId": "@guest", "serviceId": service_id, "amount": 400})).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/user/orders/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    assert_eq!(body[0]["service_name"], "7 Day Pack");

    let (status, body) = send(&app, Method::GET, "/api/user/orders/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let token = admin_token(&app).await;
    let (_, all) = send(&app, Method::GET, "/api/admin/orders", None, Some(&token)).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["user_email"], Value::Null);
    assert_eq!(all[1]["user_email"], "buyer@example.com");
    assert_eq!(all[1]["id"], second.as_str());
    assert_eq!(all[1]["service_name"], "7 Day Pack");
}

#[tokio::test]
async fn test_storefront_views_hide_owner_email() {
    let app = app().await;
    let service_id = seven_day_pack(&app).await;
    let (_, reg) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({"email": "private@example.com", "password": "password123"})),
        None,
    )
    .await;
    let user_id = reg["userId"].as_i64().unwrap();
    let order_id = place_order(
        &app,
        json!({"telegramId": "@p", "serviceId": service_id, "amount": 400, "userId": user_id}),
    )
    .await;

    let (status, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["user_id"], user_id);
    assert!(order.get("user_email").is_none(), "{order}");

    let (status, mine) = send(&app, Method::GET, &format!("/api/user/orders/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].get("user_email").is_none(), "{}", mine[0]);
    assert!(!mine[0].to_string().contains("private@example.com"));
}

#[tokio::test]
async fn test_confirm_errors() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": "MARS-MISSING00", "utr": "123"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": "MARS-MISSING00"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": "MARS-MISSING00", "status": "completed"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_confirm_status_branch_requires_admin() {
    let app = app().await;
    let service_id = seven_day_pack(&app).await;
    let order_id = place_order(&app, json!({"telegramId": "@x", "serviceId": service_id, "amount": 400})).await;
    let token = admin_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": order_id, "status": "shipped"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders/confirm",
        Some(json!({"orderId": order_id, "status": "failed"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(order["status"], "failed");
}

#[tokio::test]
async fn test_admin_routes_reject_bad_sessions() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/admin/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let expired = forged_token(JWT_SECRET, "admin", -120);
    let (status, _) = send(&app, Method::GET, "/api/admin/orders", None, Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = forged_token("not-the-secret", "admin", 600);
    let (status, _) = send(&app, Method::GET, "/api/admin/orders", None, Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_role = forged_token(JWT_SECRET, "customer", 600);
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/admin/services/1",
        None,
        Some(&wrong_role),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/admin/orders", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({"adminId": ADMIN_ID, "password": "nope"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_admin_login_response_shape() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({"adminId": ADMIN_ID, "password": ADMIN_PASSWORD})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_admin_order_update_and_delete() {
    let app = app().await;
    let service_id = seven_day_pack(&app).await;
    let order_id = place_order(&app, json!({"telegramId": "@x", "serviceId": service_id, "amount": 400})).await;
    let token = admin_token(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/orders/update",
        Some(json!({"orderId": order_id, "telegramId": "@renamed", "amount": "450"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(order["telegram_id"], "@renamed");
    assert_eq!(order["amount"], 450);
    assert_eq!(order["status"], "pending");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/orders/update",
        Some(json!({"orderId": order_id})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/orders/{order_id}"),
        Some(json!({"utr": "   "})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let (_, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(order["utr"], Value::Null);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/admin/orders/{order_id}/status"),
        Some(json!({"status": "failed", "reason": "payment not received"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/services/{service_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/orders/{order_id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/orders/{order_id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/services/{service_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_catalog_update() {
    let app = app().await;
    let token = admin_token(&app).await;
    let service_id = seven_day_pack(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/services/{service_id}"),
        Some(json!({"name": "7 Day Pack", "price": 450, "duration": "7 Days"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"]["price"], 450);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/admin/services/9999",
        Some(json!({"name": "Ghost", "price": 1, "duration": "1 Day"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/services",
        Some(json!({"name": "Free", "price": 0, "duration": "1 Day"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_disabled_without_model() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/api/chat", Some(json!({"message": "hi"})), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_chat_relays_to_model() {
    let app = app_with_chat(Some(Arc::new(EchoChat))).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(json!({
            "message": "price of 7 days?",
            "history": [{"role": "user", "text": "hello"}, {"role": "model", "text": "hi!"}]
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "price of 7 days? (2 turns)");

    let (status, _) = send(&app, Method::POST, "/api/chat", Some(json!({"message": ""})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_openapi_served() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Mars Storefront API");
}
