//! Route definitions for the `/prescription-medications` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::prescription_medications;
use crate::state::AppState;

/// Routes mounted at `/prescription-medications`.
///
/// ```text
/// GET    /       -> list (?prescription_id)
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(prescription_medications::list).post(prescription_medications::create),
        )
        .route(
            "/{id}",
            get(prescription_medications::get_by_id)
                .put(prescription_medications::update)
                .delete(prescription_medications::delete),
        )
}
