/**
 * Health Routes
 * Liveness and database checks for the API
 */
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Pin the uptime origin to process start rather than the first health request.
pub fn init_start_time() {
    Lazy::force(&SERVER_START);
}

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since startup
    pub uptime: u64,
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
    })
}

/// GET /api/health/database - Time a trivial query against the pool
pub async fn health_database(State(state): State<AppState>) -> Json<ServiceCheck> {
    let check = match crate::db::health_check(&state.pool).await {
        Ok(duration) => ServiceCheck {
            status: "healthy".to_string(),
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            ServiceCheck {
                status: "unhealthy".to_string(),
                response_time: None,
                error: Some(e.to_string()),
            }
        }
    };

    Json(check)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{send, test_app, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_ok_with_timestamp() {
        let state = test_state().await;
        let (status, body) = send(test_app(state), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        let ts = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(body["uptime"].is_u64());
    }

    #[tokio::test]
    async fn test_database_health_when_pool_is_up() {
        let state = test_state().await;
        let (status, body) = send(test_app(state), get("/api/health/database")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["responseTime"].is_u64());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_database_health_after_pool_closed() {
        let state = test_state().await;
        state.pool.close().await;
        let (_, body) = send(test_app(state), get("/api/health/database")).await;
        assert_eq!(body["status"], "unhealthy");
        assert!(body["error"].is_string());
        assert!(body.get("responseTime").is_none());
    }
}
