//! Route definitions for the `/prescriptions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::prescriptions;
use crate::state::AppState;

/// Routes mounted at `/prescriptions`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /active           -> list_active
/// POST   /shared           -> create_shared
/// POST   /renew            -> renew
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/supersede   -> supersede
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(prescriptions::list).post(prescriptions::create))
        .route("/active", get(prescriptions::list_active))
        .route("/shared", post(prescriptions::create_shared))
        .route("/renew", post(prescriptions::renew))
        .route(
            "/{id}",
            get(prescriptions::get_by_id)
                .put(prescriptions::update)
                .delete(prescriptions::delete),
        )
        .route("/{id}/supersede", post(prescriptions::supersede))
}
