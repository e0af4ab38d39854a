//! Route definitions for the `/ingredients` catalogue.

use axum::routing::get;
use axum::Router;

use crate::handlers::ingredients;
use crate::state::AppState;

/// Routes mounted at `/ingredients`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create (admin only)
/// GET    /search                -> search (?name)
/// GET    /{code}                -> get_by_code
/// GET    /{code}/combinations   -> combinations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ingredients::list).post(ingredients::create))
        .route("/search", get(ingredients::search))
        .route("/{code}", get(ingredients::get_by_code))
        .route("/{code}/combinations", get(ingredients::combinations))
}
