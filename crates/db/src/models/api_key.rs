//! API key model.

use bokyak_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `api_keys` table. The key itself is never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub expires_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing a freshly issued key.
#[derive(Debug, Clone)]
pub struct CreateApiKey {
    pub user_id: DbId,
    pub key_hash: String,
    pub key_prefix: String,
    pub expires_at: Timestamp,
}

/// Owner of a valid key, resolved during request authentication.
#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyOwner {
    pub api_key_id: DbId,
    pub user_id: DbId,
    pub role: String,
}
