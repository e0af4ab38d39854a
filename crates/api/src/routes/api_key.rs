//! Route definitions for the `/api-key` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::api_key;
use crate::state::AppState;

/// Routes mounted at `/api-key`.
///
/// ```text
/// GET  /  -> show (masked)
/// POST /  -> issue (plaintext returned once)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(api_key::show).post(api_key::issue))
}
