//! Route definitions for the `/medications` drug reference.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::medications;
use crate::state::AppState;

/// Routes mounted at `/medications`.
///
/// ```text
/// GET    /            -> list (?search)
/// POST   /            -> create (admin only)
/// GET    /{item_seq}  -> get_by_item_seq
/// PUT    /{item_seq}  -> update (admin only)
/// DELETE /{item_seq}  -> delete (admin only)
/// POST   /{item_seq}/ingredients -> add_ingredient (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(medications::list).post(medications::create))
        .route(
            "/{item_seq}",
            get(medications::get_by_item_seq)
                .put(medications::update)
                .delete(medications::delete),
        )
        .route("/{item_seq}/ingredients", post(medications::add_ingredient))
}
