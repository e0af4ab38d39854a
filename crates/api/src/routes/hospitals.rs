//! Route definitions for the `/hospitals` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::hospitals;
use crate::state::AppState;

/// Routes mounted at `/hospitals`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// POST   /save   -> save (upsert)
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hospitals::list).post(hospitals::create))
        .route("/save", post(hospitals::save))
        .route(
            "/{id}",
            get(hospitals::get_by_id)
                .put(hospitals::update)
                .delete(hospitals::delete),
        )
}
