//! Route definitions for `/analytics`.

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET /statistics     -> statistics (?days=30)
/// GET /compliance     -> compliance_rate (?days=7)
/// GET /low-stock      -> low_stock (?threshold=5)
/// GET /side-effects   -> side_effect_summary (?days=30)
/// GET /timing         -> timing_analysis (?days=30)
/// GET /adherence      -> adherence (?period&group_id)
/// GET /trends         -> trends
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(analytics::statistics))
        .route("/compliance", get(analytics::compliance_rate))
        .route("/low-stock", get(analytics::low_stock))
        .route("/side-effects", get(analytics::side_effect_summary))
        .route("/timing", get(analytics::timing_analysis))
        .route("/adherence", get(analytics::adherence))
        .route("/trends", get(analytics::trends))
}
