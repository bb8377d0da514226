use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and the rest are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window,
        ));
        Self {
            pool,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}
