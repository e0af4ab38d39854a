//! Repository for the `api_keys` table. A user holds at most one key.

use bokyak_core::types::DbId;
use sqlx::PgPool;

use crate::models::api_key::{ApiKey, ApiKeyOwner, CreateApiKey};

const COLUMNS: &str =
    "id, user_id, key_hash, key_prefix, expires_at, last_used_at, created_at, updated_at";

/// Provides issuance and lookup of API keys.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// The caller's current key, if any (expired keys included).
    pub async fn find_for_user(pool: &PgPool, user_id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE user_id = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete the user's existing key and store a new one, atomically.
    pub async fn replace_for_user(pool: &PgPool, input: &CreateApiKey) -> Result<ApiKey, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM api_keys WHERE user_id = $1")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO api_keys (user_id, key_hash, key_prefix, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let key = sqlx::query_as::<_, ApiKey>(&query)
            .bind(input.user_id)
            .bind(&input.key_hash)
            .bind(&input.key_prefix)
            .bind(input.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(key)
    }

    /// Resolve a key hash to its owner.
    ///
    /// Only unexpired keys of active users match.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<ApiKeyOwner>, sqlx::Error> {
        sqlx::query_as::<_, ApiKeyOwner>(
            "SELECT k.id AS api_key_id, u.id AS user_id, u.role
             FROM api_keys k
             JOIN users u ON u.id = k.user_id
             WHERE k.key_hash = $1
               AND k.expires_at > NOW()
               AND u.is_active = true",
        )
        .bind(key_hash)
        .fetch_optional(pool)
        .await
    }

    /// Stamp `last_used_at` with the current time.
    pub async fn touch_last_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Remove the user's key. Returns `true` if a key existed.
    pub async fn delete_for_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_keys WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
