use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use auth_server::config::JwtConfig;
use auth_server::handlers::jwt::TokenIssuer;
use auth_server::handlers::password::PasswordHasher;
use auth_server::routes;
use auth_server::services::auth_service::AuthService;
use auth_server::state::AppState;
use auth_server::store::InMemoryCredentialStore;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        expiry_hours: None,
    }
}

/// Build the application router over a fresh in-memory store.
///
/// Uses bcrypt's minimum cost so the suite stays fast.
pub fn build_test_app() -> (Router, InMemoryCredentialStore) {
    let store = InMemoryCredentialStore::new();
    let service = AuthService::new(
        Arc::new(store.clone()),
        PasswordHasher::new(4),
        TokenIssuer::new(&test_jwt_config()),
        Duration::from_secs(5),
    );
    let app = routes::app(AppState::new(service), Some("http://localhost:5173"));
    (app, store)
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_with_header(
    app: Router,
    uri: &str,
    name: header::HeaderName,
    value: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
