//! Route definitions for the `/cycles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cycles;
use crate::state::AppState;

/// Routes mounted at `/cycles`.
///
/// ```text
/// GET    /             -> list (?group_id)
/// POST   /             -> create
/// GET    /current      -> list_current
/// GET    /expiration   -> expiration (?warning_days)
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cycles::list).post(cycles::create))
        .route("/current", get(cycles::list_current))
        .route("/expiration", get(cycles::expiration))
        .route(
            "/{id}",
            get(cycles::get_by_id)
                .put(cycles::update)
                .delete(cycles::delete),
        )
}
