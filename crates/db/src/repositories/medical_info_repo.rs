//! Repository for the `user_medical_infos` table.

use bokyak_core::types::{Date, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::medical_info::{
    CreateMedicalInfo, MedicalInfoView, RegisteredVisit, UpdateMedicalInfo, UserMedicalInfo,
};
use crate::models::prescription::CreatePrescription;
use crate::repositories::PrescriptionRepo;

const COLUMNS: &str =
    "id, user_id, hospital_id, illness_id, prescription_id, is_primary, created_at, updated_at";

/// Joined columns for [`MedicalInfoView`].
const VIEW_COLUMNS: &str = "mi.id, mi.user_id, mi.hospital_id, h.hosp_name AS hospital_name, \
                             mi.illness_id, i.ill_name AS illness_name, i.ill_type AS illness_type, \
                             mi.prescription_id, mi.is_primary, mi.created_at, mi.updated_at";

const VIEW_FROM: &str = "user_medical_infos mi
             JOIN hospitals h ON h.id = mi.hospital_id
             JOIN illnesses i ON i.id = mi.illness_id";

/// Provides CRUD operations for a user's medical infos.
pub struct MedicalInfoRepo;

impl MedicalInfoRepo {
    /// Insert a medical info owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateMedicalInfo,
    ) -> Result<UserMedicalInfo, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_medical_infos (user_id, hospital_id, illness_id, prescription_id, is_primary)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserMedicalInfo>(&query)
            .bind(user_id)
            .bind(input.hospital_id)
            .bind(input.illness_id)
            .bind(input.prescription_id)
            .bind(input.is_primary)
            .fetch_one(pool)
            .await
    }

    /// Find a medical info by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MedicalInfoView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE mi.id = $1 AND mi.user_id = $2"
        );
        sqlx::query_as::<_, MedicalInfoView>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the caller's medical infos among `ids`. Foreign and missing
    /// IDs are silently absent from the result.
    pub async fn find_many(
        pool: &PgPool,
        ids: &[DbId],
        user_id: DbId,
    ) -> Result<Vec<UserMedicalInfo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_medical_infos
             WHERE id = ANY($1) AND user_id = $2
             ORDER BY id"
        );
        sqlx::query_as::<_, UserMedicalInfo>(&query)
            .bind(ids)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's medical infos, primary first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<MedicalInfoView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE mi.user_id = $1
             ORDER BY mi.is_primary DESC, mi.created_at DESC, mi.id DESC"
        );
        sqlx::query_as::<_, MedicalInfoView>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search on hospital and illness names.
    /// A `None` term matches everything.
    pub async fn search(
        pool: &PgPool,
        user_id: DbId,
        hospital_name: Option<&str>,
        illness_name: Option<&str>,
    ) -> Result<Vec<MedicalInfoView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE mi.user_id = $1
               AND ($2::TEXT IS NULL OR h.hosp_name ILIKE '%' || $2 || '%')
               AND ($3::TEXT IS NULL OR i.ill_name ILIKE '%' || $3 || '%')
             ORDER BY mi.is_primary DESC, mi.created_at DESC, mi.id DESC"
        );
        sqlx::query_as::<_, MedicalInfoView>(&query)
            .bind(user_id)
            .bind(hospital_name)
            .bind(illness_name)
            .fetch_all(pool)
            .await
    }

    /// Number of medical infos the user has.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_medical_infos WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Owner of a medical info, or `None` if it does not exist.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT user_id FROM user_medical_infos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a medical info. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateMedicalInfo,
    ) -> Result<Option<UserMedicalInfo>, sqlx::Error> {
        let query = format!(
            "UPDATE user_medical_infos SET
                prescription_id = COALESCE($3, prescription_id),
                is_primary = COALESCE($4, is_primary)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserMedicalInfo>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.prescription_id)
            .bind(input.is_primary)
            .fetch_optional(pool)
            .await
    }

    /// Delete a medical info. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_medical_infos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get or create the medical info for `(user, hospital, illness)`, mark
    /// it primary and point it at `prescription_id`.
    pub async fn attach_prescription_with(
        conn: &mut PgConnection,
        user_id: DbId,
        hospital_id: DbId,
        illness_id: DbId,
        prescription_id: DbId,
    ) -> Result<UserMedicalInfo, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_medical_infos (user_id, hospital_id, illness_id, prescription_id, is_primary)
             VALUES ($1, $2, $3, $4, true)
             ON CONFLICT ON CONSTRAINT uq_user_medical_infos_user_hospital_illness DO UPDATE SET
                prescription_id = EXCLUDED.prescription_id,
                is_primary = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserMedicalInfo>(&query)
            .bind(user_id)
            .bind(hospital_id)
            .bind(illness_id)
            .bind(prescription_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Record a hospital visit: create a fresh empty prescription and attach
    /// it to the (possibly new) medical info for the hospital and illness.
    ///
    /// The caller must have verified that the hospital and illness are owned
    /// by `user_id`.
    pub async fn register_visit(
        pool: &PgPool,
        user_id: DbId,
        hospital_id: DbId,
        illness_id: DbId,
        prescription_date: Date,
    ) -> Result<RegisteredVisit, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prescription = PrescriptionRepo::insert_with(
            &mut tx,
            user_id,
            &CreatePrescription {
                prescription_date,
                previous_prescription_id: None,
                is_active: Some(true),
            },
        )
        .await?;
        let info = Self::attach_prescription_with(
            &mut tx,
            user_id,
            hospital_id,
            illness_id,
            prescription.id,
        )
        .await?;

        tx.commit().await?;
        Ok(RegisteredVisit {
            medical_info_id: info.id,
            prescription_id: prescription.id,
            prescription_code: prescription.prescription_code,
        })
    }
}
