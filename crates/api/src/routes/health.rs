//! Liveness check mounted at the root, outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The calendar day reminders and schedules are computed against.
    pub local_date: NaiveDate,
    pub utc_offset: String,
    /// `gateway` when pushes are posted to a remote endpoint, `log` otherwise.
    pub push_delivery: &'static str,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = bokyak_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check could not reach the database");
    }

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        local_date: state.clock.today(),
        utc_offset: state.clock.offset().to_string(),
        push_delivery: if state.push.is_remote() { "gateway" } else { "log" },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
