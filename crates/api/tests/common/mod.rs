#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use teamhub_api::auth::jwt::{generate_access_token, JwtConfig};
use teamhub_api::config::ServerConfig;
use teamhub_api::router::build_app_router;
use teamhub_api::state::AppState;
use teamhub_core::types::DbId;
use teamhub_db::repositories::UserRepo;
use teamhub_events::EventBus;

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Test `ServerConfig` matching the development defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        closed_retention_days: 7,
        jwt: jwt_config(),
    }
}

/// The production router and middleware stack over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState::new(pool, test_config(), Arc::new(EventBus::default()));
    build_app_router(state)
}

/// Insert a user and return its id together with a valid bearer token.
pub async fn create_user(pool: &PgPool, username: &str) -> (DbId, String) {
    let mut conn = pool.acquire().await.unwrap();
    let user = UserRepo::create(&mut conn, username)
        .await
        .expect("user creation should succeed");
    let token = generate_access_token(user.id, &jwt_config()).unwrap();
    (user.id, token)
}

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an `OPEN` project through the API and return its id.
pub async fn open_project(app: Router, token: &str, roles: serde_json::Value) -> DbId {
    let response = post_json_auth(
        app,
        "/api/v1/projects",
        token,
        serde_json::json!({ "title": "Compiler course team", "status": "OPEN", "roles": roles }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Apply to `project_id` through the API and return the application id.
pub async fn apply(app: Router, project_id: DbId, token: &str, role: &str) -> DbId {
    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{project_id}/applications"),
        token,
        serde_json::json!({ "role_name": role, "answers": { "why": "I like parsers" } }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
