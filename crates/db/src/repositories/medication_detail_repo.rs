//! Repository for the `medication_details` table and the joined reads
//! behind schedules, stock and refill checks.

use bokyak_core::types::{Date, DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::medication_detail::{
    CreateMedicationDetail, MedicationDetail, MedicationDetailView, RefillCandidate, ScheduleRow,
    UpdateMedicationDetail,
};

const COLUMNS: &str = "id, cycle_id, prescription_medication_id, actual_dosage_pattern, \
                        remaining_quantity, patient_adjustments, created_at, updated_at";

const PREFIXED_COLUMNS: &str = "d.id, d.cycle_id, d.prescription_medication_id, \
                                 d.actual_dosage_pattern, d.remaining_quantity, \
                                 d.patient_adjustments, d.created_at, d.updated_at";

/// Joins a detail alias `d` to its cycle `c`, group `g` and owner `mi`.
const OWNER_JOIN: &str = "JOIN medication_cycles c ON c.id = d.cycle_id
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id";

const VIEW_COLUMNS: &str = "d.id, d.cycle_id, d.prescription_medication_id, \
                             d.actual_dosage_pattern, pm.standard_dosage_pattern, \
                             d.remaining_quantity, d.patient_adjustments, \
                             pm.medication_id, m.item_name AS medication_name, \
                             g.id AS group_id, g.group_name, h.hosp_name AS hospital_name, \
                             d.created_at, d.updated_at";

const VIEW_FROM: &str = "medication_details d
             JOIN medication_cycles c ON c.id = d.cycle_id
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             JOIN hospitals h ON h.id = mi.hospital_id
             JOIN prescription_medications pm ON pm.id = d.prescription_medication_id
             JOIN medications m ON m.item_seq = pm.medication_id";

/// Provides CRUD operations and joined reads for medication details.
pub struct MedicationDetailRepo;

impl MedicationDetailRepo {
    /// Insert a detail on an existing connection.
    ///
    /// `remaining_quantity` defaults to the prescription line's
    /// `total_quantity`. Fails with `RowNotFound` if the line does not exist.
    pub async fn insert_with(
        conn: &mut PgConnection,
        input: &CreateMedicationDetail,
    ) -> Result<MedicationDetail, sqlx::Error> {
        let query = format!(
            "INSERT INTO medication_details
                (cycle_id, prescription_medication_id, actual_dosage_pattern,
                 remaining_quantity, patient_adjustments)
             SELECT $1, pm.id, $3, COALESCE($4, pm.total_quantity), COALESCE($5, '{{}}'::jsonb)
             FROM prescription_medications pm
             WHERE pm.id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MedicationDetail>(&query)
            .bind(input.cycle_id)
            .bind(input.prescription_medication_id)
            .bind(&input.actual_dosage_pattern)
            .bind(input.remaining_quantity)
            .bind(&input.patient_adjustments)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert a detail, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMedicationDetail,
    ) -> Result<MedicationDetail, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_with(&mut conn, input).await
    }

    /// Find a detail by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MedicationDetailView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE d.id = $1 AND mi.user_id = $2"
        );
        sqlx::query_as::<_, MedicationDetailView>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a detail, or `None` if it does not exist.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT mi.user_id FROM medication_details d {OWNER_JOIN}
             WHERE d.id = $1"
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the user's details, optionally for one cycle.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        cycle_id: Option<DbId>,
    ) -> Result<Vec<MedicationDetailView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE mi.user_id = $1
               AND ($2::BIGINT IS NULL OR d.cycle_id = $2)
             ORDER BY d.cycle_id DESC, d.id"
        );
        sqlx::query_as::<_, MedicationDetailView>(&query)
            .bind(user_id)
            .bind(cycle_id)
            .fetch_all(pool)
            .await
    }

    /// Details of the given cycles.
    pub async fn list_for_cycles(
        pool: &PgPool,
        cycle_ids: &[DbId],
    ) -> Result<Vec<MedicationDetailView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE d.cycle_id = ANY($1)
             ORDER BY d.cycle_id DESC, d.id"
        );
        sqlx::query_as::<_, MedicationDetailView>(&query)
            .bind(cycle_ids)
            .fetch_all(pool)
            .await
    }

    /// Details in active cycles covering `date` that still have stock.
    pub async fn list_today(
        pool: &PgPool,
        user_id: DbId,
        date: Date,
    ) -> Result<Vec<MedicationDetailView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE mi.user_id = $1
               AND c.is_active = true
               AND c.cycle_start <= $2
               AND (c.cycle_end IS NULL OR c.cycle_end >= $2)
               AND d.remaining_quantity > 0
             ORDER BY g.id, d.id"
        );
        sqlx::query_as::<_, MedicationDetailView>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// Details in active cycles with `remaining_quantity <= threshold`,
    /// lowest stock first.
    pub async fn list_low_stock(
        pool: &PgPool,
        user_id: DbId,
        threshold: f64,
    ) -> Result<Vec<MedicationDetailView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM {VIEW_FROM}
             WHERE mi.user_id = $1
               AND c.is_active = true
               AND d.remaining_quantity <= $2
             ORDER BY d.remaining_quantity, d.id"
        );
        sqlx::query_as::<_, MedicationDetailView>(&query)
            .bind(user_id)
            .bind(threshold)
            .fetch_all(pool)
            .await
    }

    /// Update a detail. Only non-`None` fields in `input` are applied;
    /// `actual_dosage_pattern: Some(None)` clears the override.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateMedicationDetail,
    ) -> Result<Option<MedicationDetail>, sqlx::Error> {
        let query = format!(
            "UPDATE medication_details d SET
                actual_dosage_pattern = CASE WHEN $6 THEN $3 ELSE d.actual_dosage_pattern END,
                remaining_quantity = COALESCE($4, d.remaining_quantity),
                patient_adjustments = COALESCE($5, d.patient_adjustments)
             FROM medication_cycles c, medication_groups g, user_medical_infos mi
             WHERE d.id = $1 AND c.id = d.cycle_id AND g.id = c.group_id
               AND mi.id = g.medical_info_id AND mi.user_id = $2
             RETURNING {PREFIXED_COLUMNS}"
        );
        sqlx::query_as::<_, MedicationDetail>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.actual_dosage_pattern.clone().flatten())
            .bind(input.remaining_quantity)
            .bind(&input.patient_adjustments)
            .bind(input.actual_dosage_pattern.is_some())
            .fetch_optional(pool)
            .await
    }

    /// Delete a detail with its records and alerts.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM medication_details d
             USING medication_cycles c, medication_groups g, user_medical_infos mi
             WHERE d.id = $1 AND c.id = d.cycle_id AND g.id = c.group_id
               AND mi.id = g.medical_info_id AND mi.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rows feeding the daily schedule for `date`.
    ///
    /// Only groups of the user's primary medical infos are considered, and
    /// per group only the latest-starting active cycle covering `date`. Each
    /// detail carries its latest record inside `[day_start, day_end)`.
    /// Rows come ordered by group.
    pub async fn schedule_rows(
        pool: &PgPool,
        user_id: DbId,
        date: Date,
        day_start: Timestamp,
        day_end: Timestamp,
        group_id: Option<DbId>,
    ) -> Result<Vec<ScheduleRow>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleRow>(
            "WITH selected_cycles AS (
                SELECT DISTINCT ON (c.group_id) c.id, c.group_id, c.cycle_number
                FROM medication_cycles c
                JOIN medication_groups g ON g.id = c.group_id
                JOIN user_medical_infos mi ON mi.id = g.medical_info_id
                WHERE mi.user_id = $1
                  AND mi.is_primary = true
                  AND c.is_active = true
                  AND c.cycle_start <= $2
                  AND (c.cycle_end IS NULL OR c.cycle_end >= $2)
                  AND ($5::BIGINT IS NULL OR g.id = $5)
                ORDER BY c.group_id, c.cycle_start DESC, c.id DESC
             )
             SELECT g.id AS group_id, g.group_code, g.group_name,
                    sc.id AS cycle_id, sc.cycle_number,
                    d.id AS medication_detail_id, d.actual_dosage_pattern,
                    pm.standard_dosage_pattern,
                    m.item_seq, m.item_name, m.entp_name, m.item_image, m.class_name,
                    m.dosage_form, m.is_prescription,
                    r.record_type, r.record_date
             FROM selected_cycles sc
             JOIN medication_groups g ON g.id = sc.group_id
             JOIN medication_details d ON d.cycle_id = sc.id
             JOIN prescription_medications pm ON pm.id = d.prescription_medication_id
             JOIN medications m ON m.item_seq = pm.medication_id
             LEFT JOIN LATERAL (
                SELECT mr.record_type, mr.record_date
                FROM medication_records mr
                WHERE mr.medication_detail_id = d.id
                  AND mr.record_date >= $3 AND mr.record_date < $4
                ORDER BY mr.record_date DESC, mr.id DESC
                LIMIT 1
             ) r ON true
             ORDER BY g.id, d.id",
        )
        .bind(user_id)
        .bind(date)
        .bind(day_start)
        .bind(day_end)
        .bind(group_id)
        .fetch_all(pool)
        .await
    }

    /// Per-user count of low-stock details in active cycles, for users who
    /// are active and accept push notifications.
    pub async fn refill_candidates(
        pool: &PgPool,
        threshold: f64,
    ) -> Result<Vec<RefillCandidate>, sqlx::Error> {
        sqlx::query_as::<_, RefillCandidate>(
            "SELECT u.id AS user_id, COUNT(d.id) AS low_stock_count
             FROM medication_details d
             JOIN medication_cycles c ON c.id = d.cycle_id
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             JOIN users u ON u.id = mi.user_id
             WHERE c.is_active = true
               AND d.remaining_quantity <= $1
               AND u.is_active = true
               AND u.push_agree = true
             GROUP BY u.id
             ORDER BY u.id",
        )
        .bind(threshold)
        .fetch_all(pool)
        .await
    }
}
