//! Route definitions for the `/groups` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::groups;
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// GET    /         -> list
/// POST   /         -> create
/// GET    /active   -> list_active
/// GET    /{id}     -> get_by_id (with active cycles and their details)
/// PUT    /{id}     -> update
/// DELETE /{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(groups::list).post(groups::create))
        .route("/active", get(groups::list_active))
        .route(
            "/{id}",
            get(groups::get_by_id)
                .put(groups::update)
                .delete(groups::delete),
        )
}
