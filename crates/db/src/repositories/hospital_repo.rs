//! Repository for the `hospitals` table.

use bokyak_core::codes::HOSPITAL_CODE_LENGTH;
use bokyak_core::types::DbId;
use sqlx::PgPool;

use crate::codes::unique_code;
use crate::models::hospital::{CreateHospital, Hospital, UpdateHospital};

const COLUMNS: &str = "id, hospital_code, user_id, hosp_code, hosp_name, hosp_type, doctor_name, \
                        address, phone_number, created_at, updated_at";

/// Provides CRUD operations for a user's hospitals.
pub struct HospitalRepo;

impl HospitalRepo {
    /// Insert a new hospital owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateHospital,
    ) -> Result<Hospital, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let code = unique_code(&mut conn, "hospitals", "hospital_code", HOSPITAL_CODE_LENGTH).await?;

        let query = format!(
            "INSERT INTO hospitals
                (hospital_code, user_id, hosp_code, hosp_name, hosp_type, doctor_name, address, phone_number)
             VALUES ($1, $2, $3, $4, COALESCE($5, ''), COALESCE($6, ''), COALESCE($7, ''), COALESCE($8, ''))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(&code)
            .bind(user_id)
            .bind(&input.hosp_code)
            .bind(&input.hosp_name)
            .bind(&input.hosp_type)
            .bind(&input.doctor_name)
            .bind(&input.address)
            .bind(&input.phone_number)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert or update the hospital identified by `(user_id, hosp_code)`.
    ///
    /// On conflict, supplied fields overwrite the stored ones and the
    /// generated `hospital_code` is kept.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateHospital,
    ) -> Result<Hospital, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let code = unique_code(&mut conn, "hospitals", "hospital_code", HOSPITAL_CODE_LENGTH).await?;

        let query = format!(
            "INSERT INTO hospitals
                (hospital_code, user_id, hosp_code, hosp_name, hosp_type, doctor_name, address, phone_number)
             VALUES ($1, $2, $3, $4, COALESCE($5, ''), COALESCE($6, ''), COALESCE($7, ''), COALESCE($8, ''))
             ON CONFLICT ON CONSTRAINT uq_hospitals_user_id_hosp_code DO UPDATE SET
                hosp_name = EXCLUDED.hosp_name,
                hosp_type = COALESCE($5, hospitals.hosp_type),
                doctor_name = COALESCE($6, hospitals.doctor_name),
                address = COALESCE($7, hospitals.address),
                phone_number = COALESCE($8, hospitals.phone_number)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(&code)
            .bind(user_id)
            .bind(&input.hosp_code)
            .bind(&input.hosp_name)
            .bind(&input.hosp_type)
            .bind(&input.doctor_name)
            .bind(&input.address)
            .bind(&input.phone_number)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a hospital by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hospitals WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's hospitals by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Hospital>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM hospitals WHERE user_id = $1 ORDER BY hosp_name, id");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a hospital. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the hospital does not exist or belongs to another user.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateHospital,
    ) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!(
            "UPDATE hospitals SET
                hosp_name = COALESCE($3, hosp_name),
                hosp_type = COALESCE($4, hosp_type),
                doctor_name = COALESCE($5, doctor_name),
                address = COALESCE($6, address),
                phone_number = COALESCE($7, phone_number)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.hosp_name)
            .bind(&input.hosp_type)
            .bind(&input.doctor_name)
            .bind(&input.address)
            .bind(&input.phone_number)
            .fetch_optional(pool)
            .await
    }

    /// Delete a hospital. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hospitals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
