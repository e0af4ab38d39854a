//! Repository for the `prescription_medications` table.

use bokyak_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::prescription_medication::{
    CreatePrescriptionMedication, PrescriptionMedication, UpdatePrescriptionMedication,
};

const COLUMNS: &str = "id, prescription_id, group_id, medication_id, standard_dosage_pattern, \
                        duration_days, total_quantity, created_at, updated_at";

const PREFIXED_COLUMNS: &str = "pm.id, pm.prescription_id, pm.group_id, pm.medication_id, \
                                 pm.standard_dosage_pattern, pm.duration_days, pm.total_quantity, \
                                 pm.created_at, pm.updated_at";

/// Provides CRUD operations for prescription lines.
pub struct PrescriptionMedicationRepo;

impl PrescriptionMedicationRepo {
    /// Insert a line on an existing connection.
    pub async fn insert_with(
        conn: &mut PgConnection,
        input: &CreatePrescriptionMedication,
    ) -> Result<PrescriptionMedication, sqlx::Error> {
        let query = format!(
            "INSERT INTO prescription_medications
                (prescription_id, group_id, medication_id, standard_dosage_pattern,
                 duration_days, total_quantity)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrescriptionMedication>(&query)
            .bind(input.prescription_id)
            .bind(input.group_id)
            .bind(input.medication_id)
            .bind(&input.standard_dosage_pattern)
            .bind(input.duration_days)
            .bind(input.total_quantity)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert a line, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePrescriptionMedication,
    ) -> Result<PrescriptionMedication, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_with(&mut conn, input).await
    }

    /// Find a line by ID, scoped to the owner of its prescription.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<PrescriptionMedication>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS}
             FROM prescription_medications pm
             JOIN prescriptions p ON p.id = pm.prescription_id
             WHERE pm.id = $1 AND p.user_id = $2"
        );
        sqlx::query_as::<_, PrescriptionMedication>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a line's prescription, or `None` if the line does not exist.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT p.user_id
             FROM prescription_medications pm
             JOIN prescriptions p ON p.id = pm.prescription_id
             WHERE pm.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List the user's lines, optionally for one prescription.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        prescription_id: Option<DbId>,
    ) -> Result<Vec<PrescriptionMedication>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS}
             FROM prescription_medications pm
             JOIN prescriptions p ON p.id = pm.prescription_id
             WHERE p.user_id = $1
               AND ($2::BIGINT IS NULL OR pm.prescription_id = $2)
             ORDER BY pm.prescription_id DESC, pm.id"
        );
        sqlx::query_as::<_, PrescriptionMedication>(&query)
            .bind(user_id)
            .bind(prescription_id)
            .fetch_all(pool)
            .await
    }

    /// Update a line. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdatePrescriptionMedication,
    ) -> Result<Option<PrescriptionMedication>, sqlx::Error> {
        let query = format!(
            "UPDATE prescription_medications pm SET
                group_id = COALESCE($3, pm.group_id),
                standard_dosage_pattern = COALESCE($4, pm.standard_dosage_pattern),
                duration_days = COALESCE($5, pm.duration_days),
                total_quantity = COALESCE($6, pm.total_quantity)
             FROM prescriptions p
             WHERE pm.id = $1 AND p.id = pm.prescription_id AND p.user_id = $2
             RETURNING {PREFIXED_COLUMNS}"
        );
        sqlx::query_as::<_, PrescriptionMedication>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.group_id)
            .bind(&input.standard_dosage_pattern)
            .bind(input.duration_days)
            .bind(input.total_quantity)
            .fetch_optional(pool)
            .await
    }

    /// Delete a line. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM prescription_medications pm
             USING prescriptions p
             WHERE pm.id = $1 AND p.id = pm.prescription_id AND p.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
