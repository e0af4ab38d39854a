//! Route definitions for the `/medical-info` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::medical_info;
use crate::state::AppState;

/// Routes mounted at `/medical-info`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /search          -> search (?hospital_name&illness_name)
/// POST   /register-visit  -> register_visit
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(medical_info::list).post(medical_info::create))
        .route("/search", get(medical_info::search))
        .route("/register-visit", post(medical_info::register_visit))
        .route(
            "/{id}",
            get(medical_info::get_by_id)
                .put(medical_info::update)
                .delete(medical_info::delete),
        )
}
