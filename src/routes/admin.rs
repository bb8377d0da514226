/**
 * Admin Routes
 * Dashboard aggregates for the admin panel
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::routes::auth::AuthAdmin;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_contacts: i64,
    pub total_test_drives: i64,
    pub total_cars: i64,
    pub new_contacts: i64,
    pub pending_test_drives: i64,
}

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(n)
}

/// GET /api/admin/stats
pub async fn stats(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse>> {
    let pool = &state.pool;

    // Independent reads; no snapshot across counts.
    let (total_contacts, total_test_drives, total_cars, new_contacts, pending_test_drives) = tokio::try_join!(
        count(pool, "SELECT COUNT(*) FROM contacts"),
        count(pool, "SELECT COUNT(*) FROM test_drives"),
        count(pool, "SELECT COUNT(*) FROM cars WHERE active = 1"),
        count(pool, "SELECT COUNT(*) FROM contacts WHERE status = 'new'"),
        count(pool, "SELECT COUNT(*) FROM test_drives WHERE status = 'pending'"),
    )?;

    Ok(Json(StatsResponse {
        total_contacts,
        total_test_drives,
        total_cars,
        new_contacts,
        pending_test_drives,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin_token, send, test_app, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    async fn fetch_stats(state: &AppState) -> StatsResponse {
        let token = admin_token(state).await;
        let req = Request::get("/api/admin/stats")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_app(state.clone()), req).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_stats_on_fresh_store() {
        let state = test_state().await;
        assert_eq!(
            fetch_stats(&state).await,
            StatsResponse {
                total_contacts: 0,
                total_test_drives: 0,
                total_cars: 3,
                new_contacts: 0,
                pending_test_drives: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_stats_track_statuses_and_soft_deletes() {
        let state = test_state().await;
        for (name, status) in [("A", "new"), ("B", "new"), ("C", "contacted")] {
            sqlx::query("INSERT INTO contacts (name, email, status) VALUES (?, 'x@example.com', ?)")
                .bind(name)
                .bind(status)
                .execute(&state.pool)
                .await
                .unwrap();
        }
        for status in ["pending", "confirmed"] {
            sqlx::query(
                "INSERT INTO test_drives (name, email, phone, model, preferred_date, status) \
                 VALUES ('D', 'd@example.com', '555', 'Shadow S', '2026-12-01', ?)",
            )
            .bind(status)
            .execute(&state.pool)
            .await
            .unwrap();
        }
        sqlx::query("UPDATE cars SET active = 0 WHERE name = 'Shadow S'")
            .execute(&state.pool)
            .await
            .unwrap();

        let stats = fetch_stats(&state).await;
        assert_eq!(stats.total_contacts, 3);
        assert_eq!(stats.new_contacts, 2);
        assert_eq!(stats.total_test_drives, 2);
        assert_eq!(stats.pending_test_drives, 1);
        assert_eq!(stats.total_cars, 2);
    }
}
