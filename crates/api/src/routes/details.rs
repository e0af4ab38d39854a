//! Route definitions for the `/details` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::details;
use crate::state::AppState;

/// Routes mounted at `/details`.
///
/// ```text
/// GET    /            -> list (?cycle_id)
/// POST   /            -> create
/// GET    /today       -> list_today
/// GET    /low-stock   -> list_low_stock
/// GET    /{id}        -> get_by_id (with records)
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(details::list).post(details::create))
        .route("/today", get(details::list_today))
        .route("/low-stock", get(details::list_low_stock))
        .route(
            "/{id}",
            get(details::get_by_id)
                .put(details::update)
                .delete(details::delete),
        )
}
