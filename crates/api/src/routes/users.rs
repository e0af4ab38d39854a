//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /me                  -> me
/// PUT    /me                  -> update_me
/// DELETE /me                  -> deactivate_me
/// GET    /me/medical-summary  -> medical_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(users::me).put(users::update_me).delete(users::deactivate_me),
        )
        .route("/me/medical-summary", get(users::medical_summary))
}
