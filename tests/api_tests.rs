//! API 集成测试
//!
//! 用 tower 的 oneshot 直接驱动路由,持久层为进程内实现,
//! 数据库连接池为惰性创建(不会真正建连)。

mod common;

use account_service::{
    auth::{JwtService, PasswordHasher},
    middleware::AppState,
    repository::InMemoryUserRepository,
    routes::create_router,
    services::AuthService,
    session::InMemorySessionStore,
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use common::create_test_config;
use http_body_util::BodyExt;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = create_test_config();

    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(config.database.url.expose_secret())
        .expect("lazy pool");

    let users = Arc::new(InMemoryUserRepository::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let jwt = Arc::new(JwtService::from_config(&config).expect("jwt service"));
    let auth_service = Arc::new(AuthService::new(
        users,
        sessions.clone(),
        jwt,
        PasswordHasher::new(4),
    ));

    let state = Arc::new(AppState {
        config,
        db,
        sessions,
        auth_service,
    });

    create_router(state)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(email: &str, phone: &str) -> Value {
    json!({
        "email": email,
        "password": "Str0ng!Pw",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "phone": phone,
        "role": "rider",
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_then_me_flow() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            register_body("a@x.com", "15550000001"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let token = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["role"], "rider");
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_register_weak_password_rejected() {
    let app = test_app();

    let mut body = register_body("a@x.com", "15550000001");
    body["password"] = json!("alllowercase1");

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/auth/register", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_email_conflict() {
    let app = test_app();

    let first = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            register_body("a@x.com", "15550000001"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            register_body("a@x.com", "15550000002"),
        ))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["error"]["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let app = test_app();

    let registered = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            register_body("a@x.com", "15550000001"),
        ))
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({"email": "a@x.com", "password": "WrongPassword1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_logout_then_me_is_unauthorized() {
    let app = test_app();

    let registered = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            register_body("a@x.com", "15550000001"),
        ))
        .await
        .unwrap();
    let body = body_json(registered).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/logout")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let me = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_missing_special_char_rejected() {
    let app = test_app();

    let mut body = register_body("a@x.com", "15550000001");
    body["password"] = json!("NoSpecial1aa");

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/auth/register", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_verify_token_endpoint() {
    let app = test_app();

    let registered = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            register_body("a@x.com", "15550000001"),
        ))
        .await
        .unwrap();
    let registered_body = body_json(registered).await;
    let token = registered_body["access_token"].as_str().unwrap().to_string();
    let user_id = registered_body["user"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/verify-token")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["user_id"], user_id.as_str());
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["role"], "rider");

    // 登出后同一令牌校验失败
    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/logout")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/verify-token")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_verify_token_without_token_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/verify-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_error_body_carries_request_correlation_id() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/login")
                .header("content-type", "application/json")
                .header("x-correlation-id", "corr-err-42")
                .body(Body::from(
                    json!({"email": "nobody@x.com", "password": "Str0ng!Pw"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "corr-err-42"
    );

    // 错误响应体与响应头携带同一个关联 ID
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["correlation_id"], "corr-err-42");
}

#[tokio::test]
async fn test_correlation_id_echoed_in_response() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-correlation-id", "corr-echo-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "corr-echo-1"
    );
}
