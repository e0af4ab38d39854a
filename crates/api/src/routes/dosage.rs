//! Route definitions for `/dosage`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dosage;
use crate::state::AppState;

/// Routes mounted at `/dosage`.
///
/// ```text
/// GET  /today  -> today (?date&group_id)
/// GET  /next   -> next
/// POST /check  -> check (daily upsert)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/today", get(dosage::today))
        .route("/next", get(dosage::next))
        .route("/check", post(dosage::check))
}
