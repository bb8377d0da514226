//! Shared fixtures for in-process router tests.

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::db::{self, models::Admin, seed};
use crate::routes::auth::create_token;
use crate::state::AppState;

/// Fresh in-memory store, bootstrapped exactly like a real boot.
pub async fn test_state() -> AppState {
    test_state_with(AppConfig::for_tests()).await
}

pub async fn test_state_with(config: AppConfig) -> AppState {
    let pool = db::memory_pool().await;
    seed::bootstrap(&pool, &config.admin_seed).await;
    AppState::new(pool, config)
}

/// Full application router with a fixed peer address.
pub fn test_app(state: AppState) -> Router {
    crate::create_app(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 12345))))
}

/// Drive one request through the router and decode the JSON body (`Null` when empty).
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Token for the seeded admin account.
pub async fn admin_token(state: &AppState) -> String {
    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, password, email, role FROM admins WHERE username = 'admin'",
    )
    .fetch_one(&state.pool)
    .await
    .unwrap();
    create_token(&admin, &state.config.jwt).unwrap()
}
