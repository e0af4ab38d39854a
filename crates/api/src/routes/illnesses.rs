//! Route definitions for the `/illnesses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::illnesses;
use crate::state::AppState;

/// Routes mounted at `/illnesses`.
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
        .route("/", get(illnesses::list).post(illnesses::create))
        .route("/save", post(illnesses::save))
        .route(
            "/{id}",
            get(illnesses::get_by_id)
                .put(illnesses::update)
                .delete(illnesses::delete),
        )
}
