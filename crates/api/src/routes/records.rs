//! Route definitions for the `/records` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// GET    /             -> list (?start_date&end_date&group_id&record_type&medication_detail_id)
/// POST   /             -> create
/// GET    /today        -> list_today
/// GET    /statistics   -> statistics (?days)
/// POST   /bulk         -> bulk (daily check-in per item)
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list).post(records::create))
        .route("/today", get(records::list_today))
        .route("/statistics", get(records::statistics))
        .route("/bulk", post(records::bulk))
        .route(
            "/{id}",
            get(records::get_by_id)
                .put(records::update)
                .delete(records::delete),
        )
}
