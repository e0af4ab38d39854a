//! Repository for the `prescriptions` table, including supersede and
//! shared-prescription transactions.

use bokyak_core::codes::PRESCRIPTION_CODE_LENGTH;
use bokyak_core::renewal::PrescribedMedication;
use bokyak_core::types::{Date, DbId};
use sqlx::{PgConnection, PgPool};

use crate::codes::unique_code;
use crate::models::prescription::{
    CreatePrescription, CreateSharedPrescription, Prescription, UpdatePrescription,
};
use crate::models::prescription_medication::CreatePrescriptionMedication;
use crate::repositories::PrescriptionMedicationRepo;

const COLUMNS: &str = "id, prescription_code, user_id, prescription_count, prescription_date, \
                        previous_prescription_id, is_active, created_at, updated_at";

/// Provides CRUD and lifecycle operations for prescriptions.
pub struct PrescriptionRepo;

impl PrescriptionRepo {
    /// Insert a prescription on an existing connection.
    ///
    /// `prescription_count` is the previous prescription's count + 1, or 0
    /// when there is no previous prescription owned by `user_id`.
    pub async fn insert_with(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &CreatePrescription,
    ) -> Result<Prescription, sqlx::Error> {
        let code = unique_code(
            conn,
            "prescriptions",
            "prescription_code",
            PRESCRIPTION_CODE_LENGTH,
        )
        .await?;

        let query = format!(
            "INSERT INTO prescriptions
                (prescription_code, user_id, prescription_count, prescription_date,
                 previous_prescription_id, is_active)
             VALUES (
                $1, $2,
                COALESCE(
                    (SELECT prescription_count + 1 FROM prescriptions WHERE id = $4 AND user_id = $2),
                    0
                ),
                $3, $4, COALESCE($5, true)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(&code)
            .bind(user_id)
            .bind(input.prescription_date)
            .bind(input.previous_prescription_id)
            .bind(input.is_active)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert a prescription owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreatePrescription,
    ) -> Result<Prescription, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_with(&mut conn, user_id, input).await
    }

    /// Find a prescription by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prescriptions WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a prescription, or `None` if it does not exist.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT user_id FROM prescriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's prescriptions, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Prescription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prescriptions
             WHERE user_id = $1
             ORDER BY prescription_date DESC, id DESC"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's active prescriptions, newest first.
    pub async fn list_active(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Prescription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prescriptions
             WHERE user_id = $1 AND is_active = true
             ORDER BY prescription_date DESC, id DESC"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a prescription. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdatePrescription,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!(
            "UPDATE prescriptions SET
                prescription_date = COALESCE($3, prescription_date),
                is_active = COALESCE($4, is_active)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.prescription_date)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a prescription. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a prescription inactive on an existing connection.
    pub async fn deactivate_with(
        conn: &mut PgConnection,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE prescriptions SET is_active = false WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert `medications` as lines of `prescription_id`, not yet grouped.
    async fn insert_lines_with(
        conn: &mut PgConnection,
        prescription_id: DbId,
        medications: &[PrescribedMedication],
    ) -> Result<(), sqlx::Error> {
        for med in medications {
            PrescriptionMedicationRepo::insert_with(
                conn,
                &CreatePrescriptionMedication {
                    prescription_id,
                    group_id: None,
                    medication_id: med.medication_id,
                    standard_dosage_pattern: med.dosage_pattern.clone(),
                    duration_days: med.duration_days,
                    total_quantity: med.total_quantity,
                },
            )
            .await?;
        }
        Ok(())
    }

    /// Replace a prescription with a successor in one transaction.
    ///
    /// The old prescription is deactivated, the successor links back to it,
    /// and every group and medical info pointing at the old prescription is
    /// repointed. Returns `None` if `id` is not owned by `user_id`.
    pub async fn supersede(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        prescription_date: Date,
        medications: &[PrescribedMedication],
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owned = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM prescriptions WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        Self::deactivate_with(&mut tx, id, user_id).await?;
        let successor = Self::insert_with(
            &mut tx,
            user_id,
            &CreatePrescription {
                prescription_date,
                previous_prescription_id: Some(id),
                is_active: Some(true),
            },
        )
        .await?;

        sqlx::query("UPDATE medication_groups SET prescription_id = $2 WHERE prescription_id = $1")
            .bind(id)
            .bind(successor.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE user_medical_infos SET prescription_id = $2
             WHERE prescription_id = $1 AND user_id = $3",
        )
        .bind(id)
        .bind(successor.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        Self::insert_lines_with(&mut tx, successor.id, medications).await?;

        tx.commit().await?;
        Ok(Some(successor))
    }

    /// Create one prescription shared by several medical infos.
    ///
    /// The caller must have verified that every medical info is owned by
    /// `user_id`.
    pub async fn create_shared(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSharedPrescription,
    ) -> Result<Prescription, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prescription = Self::insert_with(
            &mut tx,
            user_id,
            &CreatePrescription {
                prescription_date: input.prescription_date,
                previous_prescription_id: None,
                is_active: Some(true),
            },
        )
        .await?;

        sqlx::query(
            "UPDATE user_medical_infos SET prescription_id = $1
             WHERE id = ANY($2) AND user_id = $3",
        )
        .bind(prescription.id)
        .bind(&input.medical_info_ids)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        Self::insert_lines_with(&mut tx, prescription.id, &input.medications).await?;

        tx.commit().await?;
        Ok(prescription)
    }
}
