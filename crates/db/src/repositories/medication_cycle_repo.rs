//! Repository for the `medication_cycles` table.

use bokyak_core::cycles::next_cycle_number;
use bokyak_core::types::{Date, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::medication_cycle::{
    CreateMedicationCycle, CycleExpirationRow, MedicationCycle, UpdateMedicationCycle,
};

const COLUMNS: &str =
    "id, group_id, cycle_number, cycle_start, cycle_end, is_active, created_at, updated_at";

const PREFIXED_COLUMNS: &str = "c.id, c.group_id, c.cycle_number, c.cycle_start, c.cycle_end, \
                                 c.is_active, c.created_at, c.updated_at";

/// Joins a cycle alias `c` to its owner `mi.user_id`.
const OWNER_JOIN: &str = "JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id";

/// Provides CRUD operations for medication cycles.
pub struct MedicationCycleRepo;

impl MedicationCycleRepo {
    /// Insert a cycle on an existing connection.
    ///
    /// When `input.cycle_number` is `None` the group's next number is used.
    /// The group row is locked so concurrent inserts number sequentially.
    pub async fn insert_with(
        conn: &mut PgConnection,
        input: &CreateMedicationCycle,
    ) -> Result<MedicationCycle, sqlx::Error> {
        sqlx::query("SELECT id FROM medication_groups WHERE id = $1 FOR UPDATE")
            .bind(input.group_id)
            .execute(&mut *conn)
            .await?;

        let cycle_number = match input.cycle_number {
            Some(n) => n,
            None => {
                let current_max = sqlx::query_scalar::<_, Option<i32>>(
                    "SELECT MAX(cycle_number) FROM medication_cycles WHERE group_id = $1",
                )
                .bind(input.group_id)
                .fetch_one(&mut *conn)
                .await?;
                next_cycle_number(current_max)
            }
        };

        let query = format!(
            "INSERT INTO medication_cycles (group_id, cycle_number, cycle_start, cycle_end, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MedicationCycle>(&query)
            .bind(input.group_id)
            .bind(cycle_number)
            .bind(input.cycle_start)
            .bind(input.cycle_end)
            .bind(input.is_active)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert a cycle in its own transaction, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMedicationCycle,
    ) -> Result<MedicationCycle, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let cycle = Self::insert_with(&mut tx, input).await?;
        tx.commit().await?;
        Ok(cycle)
    }

    /// Find a cycle by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MedicationCycle>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_cycles c {OWNER_JOIN}
             WHERE c.id = $1 AND mi.user_id = $2"
        );
        sqlx::query_as::<_, MedicationCycle>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a cycle, or `None` if it does not exist.
    pub async fn owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT mi.user_id FROM medication_cycles c {OWNER_JOIN}
             WHERE c.id = $1"
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the user's cycles, optionally for one group.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        group_id: Option<DbId>,
    ) -> Result<Vec<MedicationCycle>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_cycles c {OWNER_JOIN}
             WHERE mi.user_id = $1
               AND ($2::BIGINT IS NULL OR c.group_id = $2)
             ORDER BY c.group_id, c.cycle_number DESC"
        );
        sqlx::query_as::<_, MedicationCycle>(&query)
            .bind(user_id)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Active cycles of the user whose range covers `date`.
    pub async fn list_current(
        pool: &PgPool,
        user_id: DbId,
        date: Date,
    ) -> Result<Vec<MedicationCycle>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_cycles c {OWNER_JOIN}
             WHERE mi.user_id = $1
               AND c.is_active = true
               AND c.cycle_start <= $2
               AND (c.cycle_end IS NULL OR c.cycle_end >= $2)
             ORDER BY c.group_id, c.cycle_start DESC"
        );
        sqlx::query_as::<_, MedicationCycle>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    /// Active cycles of one group, newest first.
    pub async fn list_active_for_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<MedicationCycle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM medication_cycles
             WHERE group_id = $1 AND is_active = true
             ORDER BY cycle_start DESC, id DESC"
        );
        sqlx::query_as::<_, MedicationCycle>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Update a cycle. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateMedicationCycle,
    ) -> Result<Option<MedicationCycle>, sqlx::Error> {
        let query = format!(
            "UPDATE medication_cycles c SET
                cycle_start = COALESCE($3, c.cycle_start),
                cycle_end = COALESCE($4, c.cycle_end),
                is_active = COALESCE($5, c.is_active)
             FROM medication_groups g, user_medical_infos mi
             WHERE c.id = $1 AND g.id = c.group_id AND mi.id = g.medical_info_id
               AND mi.user_id = $2
             RETURNING {PREFIXED_COLUMNS}"
        );
        sqlx::query_as::<_, MedicationCycle>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.cycle_start)
            .bind(input.cycle_end)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a cycle with its details. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM medication_cycles c
             USING medication_groups g, user_medical_infos mi
             WHERE c.id = $1 AND g.id = c.group_id AND mi.id = g.medical_info_id
               AND mi.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Close the active cycles of every group pointing at `prescription_id`:
    /// deactivate them and end them on `today`. Returns the number closed.
    pub async fn close_for_prescription_with(
        conn: &mut PgConnection,
        prescription_id: DbId,
        today: Date,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE medication_cycles c SET is_active = false, cycle_end = $2
             FROM medication_groups g
             WHERE g.id = c.group_id AND g.prescription_id = $1 AND c.is_active = true",
        )
        .bind(prescription_id)
        .bind(today)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// The user's active cycles with group and hospital names, for the
    /// expiration check.
    pub async fn expiration_rows(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CycleExpirationRow>, sqlx::Error> {
        sqlx::query_as::<_, CycleExpirationRow>(
            "SELECT c.id AS cycle_id, g.id AS group_id, g.group_name, c.cycle_end,
                    h.hosp_name AS hospital_name, g.prescription_id
             FROM medication_cycles c
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             JOIN hospitals h ON h.id = mi.hospital_id
             WHERE mi.user_id = $1 AND c.is_active = true
             ORDER BY c.cycle_end NULLS LAST, c.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
