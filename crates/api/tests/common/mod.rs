#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use kwiki_core::money::Percentage;
use kwiki_core::types::EntityId;
use kwiki_db::models::identity::CreateIdentity;
use kwiki_db::repositories::IdentityRepo;
use kwiki_events::EventBus;
use kwiki_payments::memory::InMemoryGateway;
use sqlx::PgPool;
use tower::ServiceExt;

use kwiki_api::auth::jwt::{generate_access_token, JwtConfig};
use kwiki_api::auth::password::hash_password;
use kwiki_api::config::ServerConfig;
use kwiki_api::router::build_app_router;
use kwiki_api::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        auth_code_ttl_mins: 15,
        platform_fee: Percentage::new(10).unwrap(),
    }
}

/// Everything a test may want to reach behind the router.
pub struct TestApp {
    pub router: Router,
    pub event_bus: Arc<EventBus>,
    pub gateway: Arc<InMemoryGateway>,
}

/// Build the application exactly as the binary does, with the in-memory
/// payment gateway.
pub fn spawn_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let gateway = Arc::new(InMemoryGateway::new());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        gateway: gateway.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        event_bus,
        gateway,
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    spawn_app(pool).router
}

/// Insert an identity with the given principal role and mint an access token
/// for it.
pub async fn create_identity(pool: &PgPool, username: &str, role: &str) -> (EntityId, String) {
    let (identity, principal) = IdentityRepo::create_with_principal(
        pool,
        &CreateIdentity {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            language: "ko".to_string(),
        },
        role,
    )
    .await
    .unwrap();
    let token = generate_access_token(identity.id, &principal.role, &test_config().jwt).unwrap();
    (identity.id, token)
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), Some(body))).await
}

/// POST without a body, for workflow actions.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), None)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `data` member of an enveloped response.
pub async fn data(response: Response<Body>) -> serde_json::Value {
    let mut json = body_json(response).await;
    json["data"].take()
}
