//! Repository for the `illnesses` table.

use bokyak_core::codes::ILLNESS_CODE_LENGTH;
use bokyak_core::illness::ILL_DISEASE;
use bokyak_core::types::DbId;
use sqlx::PgPool;

use crate::codes::unique_code;
use crate::models::illness::{CreateIllness, Illness, UpdateIllness};

const COLUMNS: &str = "id, illness_code, user_id, ill_type, ill_name, ill_code, ill_start, ill_end, \
                        is_chronic, created_at, updated_at";

/// Provides CRUD operations for a user's illnesses.
pub struct IllnessRepo;

impl IllnessRepo {
    /// Insert a new illness owned by `user_id`. `ill_type` defaults to `DISEASE`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateIllness,
    ) -> Result<Illness, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let code = unique_code(&mut conn, "illnesses", "illness_code", ILLNESS_CODE_LENGTH).await?;

        let query = format!(
            "INSERT INTO illnesses
                (illness_code, user_id, ill_type, ill_name, ill_code, ill_start, ill_end, is_chronic)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Illness>(&query)
            .bind(&code)
            .bind(user_id)
            .bind(input.ill_type.as_deref().unwrap_or(ILL_DISEASE))
            .bind(&input.ill_name)
            .bind(&input.ill_code)
            .bind(input.ill_start)
            .bind(input.ill_end)
            .bind(input.is_chronic)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert or update the illness identified by `(user_id, ill_name, ill_type)`.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateIllness,
    ) -> Result<Illness, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let code = unique_code(&mut conn, "illnesses", "illness_code", ILLNESS_CODE_LENGTH).await?;

        let query = format!(
            "INSERT INTO illnesses
                (illness_code, user_id, ill_type, ill_name, ill_code, ill_start, ill_end, is_chronic)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, false))
             ON CONFLICT ON CONSTRAINT uq_illnesses_user_id_name_type DO UPDATE SET
                ill_code = COALESCE($5, illnesses.ill_code),
                ill_start = COALESCE($6, illnesses.ill_start),
                ill_end = COALESCE($7, illnesses.ill_end),
                is_chronic = COALESCE($8, illnesses.is_chronic)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Illness>(&query)
            .bind(&code)
            .bind(user_id)
            .bind(input.ill_type.as_deref().unwrap_or(ILL_DISEASE))
            .bind(&input.ill_name)
            .bind(&input.ill_code)
            .bind(input.ill_start)
            .bind(input.ill_end)
            .bind(input.is_chronic)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an illness by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Illness>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM illnesses WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Illness>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's illnesses by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Illness>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM illnesses WHERE user_id = $1 ORDER BY ill_name, id");
        sqlx::query_as::<_, Illness>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update an illness. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateIllness,
    ) -> Result<Option<Illness>, sqlx::Error> {
        let query = format!(
            "UPDATE illnesses SET
                ill_type = COALESCE($3, ill_type),
                ill_name = COALESCE($4, ill_name),
                ill_code = COALESCE($5, ill_code),
                ill_start = COALESCE($6, ill_start),
                ill_end = COALESCE($7, ill_end),
                is_chronic = COALESCE($8, is_chronic)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Illness>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.ill_type)
            .bind(&input.ill_name)
            .bind(&input.ill_code)
            .bind(input.ill_start)
            .bind(input.ill_end)
            .bind(input.is_chronic)
            .fetch_optional(pool)
            .await
    }

    /// Delete an illness. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM illnesses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
