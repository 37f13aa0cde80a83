//! Shared health state for the /health endpoint.
//! Updated by the analytics task, read by the API.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::routes::ApiState;
use crate::error::AppError;

#[derive(Default)]
pub struct HealthState {
    /// Nanosecond timestamp of the process start.
    pub started_at_ns: AtomicI64,
    /// Nanosecond timestamp of the last successful analytics refresh (0 = none).
    pub last_analytics_at_ns: AtomicI64,
    /// Comparison keys written by the last analytics refresh.
    pub analytics_keys: AtomicU64,
}

impl HealthState {
    pub fn new(started_at_ns: i64) -> Self {
        let state = Self::default();
        state.started_at_ns.store(started_at_ns, Ordering::Relaxed);
        state
    }

    pub fn record_analytics(&self, at_ns: i64, keys: usize) {
        self.last_analytics_at_ns.store(at_ns, Ordering::Relaxed);
        self.analytics_keys.store(keys as u64, Ordering::Relaxed);
    }

    pub fn started_at_ns(&self) -> i64 {
        self.started_at_ns.load(Ordering::Relaxed)
    }

    pub fn last_analytics_at_ns(&self) -> i64 {
        self.last_analytics_at_ns.load(Ordering::Relaxed)
    }

    pub fn analytics_keys(&self) -> u64 {
        self.analytics_keys.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub listings: i64,
    pub uptime_secs: i64,
    pub last_analytics_at_ns: Option<i64>,
    pub analytics_keys: u64,
}

pub async fn get_health(State(state): State<ApiState>) -> Result<Json<HealthResponse>, AppError> {
    let (listings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM watch_listings")
        .fetch_one(&state.pool)
        .await?;

    let last = state.health.last_analytics_at_ns();
    Ok(Json(HealthResponse {
        status: "ok",
        listings,
        uptime_secs: (crate::now_ns() - state.health.started_at_ns()) / 1_000_000_000,
        last_analytics_at_ns: (last > 0).then_some(last),
        analytics_keys: state.health.analytics_keys(),
    }))
}
