//! Per-IP fixed-window request budget for the `/api` routes.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    hits: RwLock<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: RwLock::new(HashMap::new()),
        }
    }

    /// Count one request from `ip`; false once the budget for the current window is spent.
    pub async fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.write().await;

        // Evict expired windows so memory tracks active clients only.
        hits.retain(|_, w| now.duration_since(w.started) < self.window);

        let entry = hits.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    #[cfg(test)]
    pub async fn tracked_clients(&self) -> usize {
        self.hits.read().await.len()
    }
}

pub async fn enforce(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !state.rate_limiter.check(addr.ip()).await {
        tracing::warn!(ip = %addr.ip(), uri = %request.uri(), "rate limit exceeded");
        return AppError::TooManyRequests.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const A: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const B: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[tokio::test]
    async fn test_blocks_after_budget_is_spent() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check(A).await);
        }
        assert!(!limiter.check(A).await);
        assert!(!limiter.check(A).await);
    }

    #[tokio::test]
    async fn test_budgets_are_per_ip() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(A).await);
        assert!(!limiter.check(A).await);
        assert!(limiter.check(B).await);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_budget_and_evicts() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.check(A).await);
        assert!(!limiter.check(A).await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check(B).await);
        assert_eq!(limiter.tracked_clients().await, 1, "stale window for A evicted");
        assert!(limiter.check(A).await);
    }
}
