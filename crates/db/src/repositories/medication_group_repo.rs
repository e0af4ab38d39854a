//! Repository for the `medication_groups` table.

use bokyak_core::codes::GROUP_CODE_LENGTH;
use bokyak_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::codes::unique_code;
use crate::models::medication_group::{
    CreateMedicationGroup, MedicationGroup, UpdateMedicationGroup,
};

const COLUMNS: &str = "id, group_code, medical_info_id, prescription_id, group_name, \
                        reminder_enabled, created_at, updated_at";

const PREFIXED_COLUMNS: &str = "g.id, g.group_code, g.medical_info_id, g.prescription_id, \
                                 g.group_name, g.reminder_enabled, g.created_at, g.updated_at";

/// Provides CRUD operations for medication groups.
pub struct MedicationGroupRepo;

impl MedicationGroupRepo {
    /// Insert a group with a fresh `group_code` on an existing connection.
    pub async fn insert_with(
        conn: &mut PgConnection,
        input: &CreateMedicationGroup,
    ) -> Result<MedicationGroup, sqlx::Error> {
        let code = unique_code(conn, "medication_groups", "group_code", GROUP_CODE_LENGTH).await?;

        let query = format!(
            "INSERT INTO medication_groups
                (group_code, medical_info_id, prescription_id, group_name, reminder_enabled)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MedicationGroup>(&query)
            .bind(&code)
            .bind(input.medical_info_id)
            .bind(input.prescription_id)
            .bind(&input.group_name)
            .bind(input.reminder_enabled)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert a group, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMedicationGroup,
    ) -> Result<MedicationGroup, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_with(&mut conn, input).await
    }

    /// Find a group by ID, scoped to the owner of its medical info.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MedicationGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS}
             FROM medication_groups g
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             WHERE g.id = $1 AND mi.user_id = $2"
        );
        sqlx::query_as::<_, MedicationGroup>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a group, or `None` if it does not exist.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT mi.user_id
             FROM medication_groups g
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             WHERE g.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List all of a user's groups, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<MedicationGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS}
             FROM medication_groups g
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             WHERE mi.user_id = $1
             ORDER BY g.created_at DESC, g.id DESC"
        );
        sqlx::query_as::<_, MedicationGroup>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List the user's groups that have at least one active cycle.
    pub async fn list_active(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<MedicationGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS}
             FROM medication_groups g
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             WHERE mi.user_id = $1
               AND EXISTS (
                   SELECT 1 FROM medication_cycles c
                   WHERE c.group_id = g.id AND c.is_active = true
               )
             ORDER BY g.created_at DESC, g.id DESC"
        );
        sqlx::query_as::<_, MedicationGroup>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a group. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateMedicationGroup,
    ) -> Result<Option<MedicationGroup>, sqlx::Error> {
        let query = format!(
            "UPDATE medication_groups g SET
                prescription_id = COALESCE($3, g.prescription_id),
                group_name = COALESCE($4, g.group_name),
                reminder_enabled = COALESCE($5, g.reminder_enabled)
             FROM user_medical_infos mi
             WHERE g.id = $1 AND mi.id = g.medical_info_id AND mi.user_id = $2
             RETURNING {PREFIXED_COLUMNS}"
        );
        sqlx::query_as::<_, MedicationGroup>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.prescription_id)
            .bind(&input.group_name)
            .bind(input.reminder_enabled)
            .fetch_optional(pool)
            .await
    }

    /// Delete a group with its cycles. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM medication_groups g
             USING user_medical_infos mi
             WHERE g.id = $1 AND mi.id = g.medical_info_id AND mi.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
