//! Repository for the `medication_alerts` table.

use bokyak_core::alerts::ALERT_DOSAGE;
use bokyak_core::types::DbId;
use chrono::NaiveTime;
use sqlx::{PgConnection, PgPool};

use crate::models::medication_alert::{
    CreateMedicationAlert, DueReminder, MedicationAlert, UpdateMedicationAlert,
};

const COLUMNS: &str =
    "id, medication_detail_id, alert_type, alert_time, is_active, message, created_at, updated_at";

const PREFIXED_COLUMNS: &str = "a.id, a.medication_detail_id, a.alert_type, a.alert_time, \
                                 a.is_active, a.message, a.created_at, a.updated_at";

/// Joins an alert alias `a` to its detail, cycle, group and owner `mi`.
const OWNER_JOIN: &str = "JOIN medication_details d ON d.id = a.medication_detail_id
             JOIN medication_cycles c ON c.id = d.cycle_id
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id";

/// Provides CRUD operations and reminder queries for alerts.
pub struct MedicationAlertRepo;

impl MedicationAlertRepo {
    /// Insert an active alert on an existing connection.
    pub async fn insert_with(
        conn: &mut PgConnection,
        medication_detail_id: DbId,
        alert_type: &str,
        alert_time: NaiveTime,
        message: &str,
    ) -> Result<MedicationAlert, sqlx::Error> {
        let query = format!(
            "INSERT INTO medication_alerts (medication_detail_id, alert_type, alert_time, message)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(medication_detail_id)
            .bind(alert_type)
            .bind(alert_time)
            .bind(message)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert an alert, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMedicationAlert,
    ) -> Result<MedicationAlert, sqlx::Error> {
        let query = format!(
            "INSERT INTO medication_alerts
                (medication_detail_id, alert_type, alert_time, is_active, message)
             VALUES ($1, $2, $3, COALESCE($4, true), COALESCE($5, ''))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(input.medication_detail_id)
            .bind(&input.alert_type)
            .bind(input.alert_time)
            .bind(input.is_active)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Find an alert by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MedicationAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_alerts a {OWNER_JOIN}
             WHERE a.id = $1 AND mi.user_id = $2"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the user's alerts by time of day.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<MedicationAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_alerts a {OWNER_JOIN}
             WHERE mi.user_id = $1
             ORDER BY a.alert_time, a.id"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List the user's active alerts by time of day.
    pub async fn list_active(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<MedicationAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_alerts a {OWNER_JOIN}
             WHERE mi.user_id = $1 AND a.is_active = true
             ORDER BY a.alert_time, a.id"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Active alerts with `alert_time` in `[from, to]`. When `to` is earlier
    /// than `from` the window wraps past midnight; results stay in
    /// chronological order from `from`.
    pub async fn list_upcoming(
        pool: &PgPool,
        user_id: DbId,
        from: NaiveTime,
        to: NaiveTime,
    ) -> Result<Vec<MedicationAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_alerts a {OWNER_JOIN}
             WHERE mi.user_id = $1
               AND a.is_active = true
               AND CASE WHEN $2::TIME <= $3::TIME
                        THEN a.alert_time BETWEEN $2 AND $3
                        ELSE a.alert_time >= $2 OR a.alert_time <= $3
                   END
             ORDER BY a.alert_time < $2, a.alert_time, a.id"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Update an alert. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateMedicationAlert,
    ) -> Result<Option<MedicationAlert>, sqlx::Error> {
        let query = format!(
            "UPDATE medication_alerts a SET
                alert_type = COALESCE($3, a.alert_type),
                alert_time = COALESCE($4, a.alert_time),
                is_active = COALESCE($5, a.is_active),
                message = COALESCE($6, a.message)
             FROM medication_details d, medication_cycles c, medication_groups g,
                  user_medical_infos mi
             WHERE a.id = $1 AND d.id = a.medication_detail_id AND c.id = d.cycle_id
               AND g.id = c.group_id AND mi.id = g.medical_info_id AND mi.user_id = $2
             RETURNING {PREFIXED_COLUMNS}"
        );
        sqlx::query_as::<_, MedicationAlert>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.alert_type)
            .bind(input.alert_time)
            .bind(input.is_active)
            .bind(&input.message)
            .fetch_optional(pool)
            .await
    }

    /// Delete an alert. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM medication_alerts a
             USING medication_details d, medication_cycles c, medication_groups g,
                   user_medical_infos mi
             WHERE a.id = $1 AND d.id = a.medication_detail_id AND c.id = d.cycle_id
               AND g.id = c.group_id AND mi.id = g.medical_info_id AND mi.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-user count of active DOSAGE alerts set for the minute `hh_mm`
    /// (`HH:MM`).
    ///
    /// Only alerts of active cycles in reminder-enabled groups count, and
    /// only for active users who accept push notifications.
    pub async fn due_reminders(
        pool: &PgPool,
        hh_mm: &str,
    ) -> Result<Vec<DueReminder>, sqlx::Error> {
        let query = format!(
            "SELECT mi.user_id, COUNT(a.id) AS medication_count
             FROM medication_alerts a
             {OWNER_JOIN}
             JOIN users u ON u.id = mi.user_id
             WHERE a.is_active = true
               AND a.alert_type = '{ALERT_DOSAGE}'
               AND to_char(a.alert_time, 'HH24:MI') = $1
               AND c.is_active = true
               AND g.reminder_enabled = true
               AND u.is_active = true
               AND u.push_agree = true
             GROUP BY mi.user_id
             ORDER BY mi.user_id"
        );
        sqlx::query_as::<_, DueReminder>(&query)
            .bind(hh_mm)
            .fetch_all(pool)
            .await
    }
}
