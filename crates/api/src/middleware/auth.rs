//! Request authentication extractor.
//!
//! A request authenticates with either `Authorization: Bearer <jwt>` or
//! `X-Api-Key: <key>`. When both are present the bearer token wins.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bokyak_core::api_keys::{hash_api_key, API_KEY_HEADER};
use bokyak_core::error::CoreError;
use bokyak_core::types::DbId;
use bokyak_db::repositories::ApiKeyRepo;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The authenticated caller.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// `admin` or `patient`.
    pub role: String,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_header = auth_header
                .to_str()
                .map_err(|_| unauthorized("Invalid Authorization header"))?;
            return from_bearer(auth_header, state);
        }

        if let Some(key) = parts.headers.get(API_KEY_HEADER) {
            let key = key
                .to_str()
                .map_err(|_| unauthorized("Invalid or expired API key"))?;
            return from_api_key(key.trim(), state).await;
        }

        Err(unauthorized("Missing Authorization header"))
    }
}

fn from_bearer(auth_header: &str, state: &AppState) -> AppResult<AuthUser> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| unauthorized("Invalid or expired token"))?;

    Ok(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    })
}

async fn from_api_key(key: &str, state: &AppState) -> AppResult<AuthUser> {
    if key.is_empty() {
        return Err(unauthorized("Invalid or expired API key"));
    }

    let owner = ApiKeyRepo::find_active_by_hash(&state.pool, &hash_api_key(key))
        .await?
        .ok_or_else(|| unauthorized("Invalid or expired API key"))?;

    if let Err(e) = ApiKeyRepo::touch_last_used(&state.pool, owner.api_key_id).await {
        tracing::warn!(api_key_id = owner.api_key_id, error = %e, "Failed to stamp API key usage");
    }

    Ok(AuthUser {
        user_id: owner.user_id,
        role: owner.role,
    })
}
