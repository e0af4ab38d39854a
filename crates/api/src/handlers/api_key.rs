//! Handlers for the caller's API key (`/api-key`).
//!
//! A user holds at most one key. The plaintext is returned only by
//! [`issue`]; reads show the stored prefix followed by a mask.

use axum::extract::State;
use bokyak_core::api_keys::{generate_api_key, mask_prefix, KEY_VALIDITY_DAYS};
use bokyak_core::types::Timestamp;
use bokyak_db::models::api_key::CreateApiKey;
use bokyak_db::repositories::ApiKeyRepo;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Masked view of the stored key. Serializes to `{}` when there is no key.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiKeyView {
    Present {
        apikey: String,
        created: Timestamp,
        expires: Timestamp,
    },
    Absent {},
}

/// A freshly issued key.
#[derive(Debug, Serialize)]
pub struct IssuedApiKey {
    pub apikey: String,
    pub expires: Timestamp,
}

/// GET /api/v1/api-key
pub async fn show(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ApiKeyView>> {
    let view = match ApiKeyRepo::find_for_user(&state.pool, auth.user_id).await? {
        Some(key) => ApiKeyView::Present {
            apikey: mask_prefix(&key.key_prefix),
            created: key.created_at,
            expires: key.expires_at,
        },
        None => ApiKeyView::Absent {},
    };
    Ok(ApiResponse::ok(view, "API key retrieved"))
}

/// POST /api/v1/api-key
///
/// Replace the caller's key with a new one valid for 90 days.
pub async fn issue(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<IssuedApiKey>> {
    let generated = generate_api_key();
    let expires_at = Utc::now() + Duration::days(KEY_VALIDITY_DAYS);

    let key = ApiKeyRepo::replace_for_user(
        &state.pool,
        &CreateApiKey {
            user_id: auth.user_id,
            key_hash: generated.hash,
            key_prefix: generated.prefix,
            expires_at,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        key_prefix = %key.key_prefix,
        "API key issued",
    );

    Ok(ApiResponse::created(
        IssuedApiKey {
            apikey: generated.plaintext,
            expires: key.expires_at,
        },
        "API key issued. Store it now; it will not be shown again.",
    ))
}
