//! Repository for the `medication_records` table.
//!
//! Inserting a `TAKEN` record consumes stock: the detail's
//! `remaining_quantity` drops by `quantity_taken`, floored at zero, in the
//! same transaction. Updates never touch stock.

use bokyak_core::records::{RecordType, RECORD_TAKEN};
use bokyak_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::medication_record::{
    CheckIn, CheckInOutcome, CreateMedicationRecord, MedicationRecord, RecordFactRow, RecordFilter,
    UpdateMedicationRecord,
};

const COLUMNS: &str = "id, medication_detail_id, record_type, record_date, quantity_taken, notes, \
                        effectiveness_score, tags, created_at, updated_at";

const PREFIXED_COLUMNS: &str = "r.id, r.medication_detail_id, r.record_type, r.record_date, \
                                 r.quantity_taken, r.notes, r.effectiveness_score, r.tags, \
                                 r.created_at, r.updated_at";

/// Joins a record alias `r` to its detail, cycle, group and owner `mi`.
const OWNER_JOIN: &str = "JOIN medication_details d ON d.id = r.medication_detail_id
             JOIN medication_cycles c ON c.id = d.cycle_id
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id";

/// Provides CRUD operations and check-ins for intake records.
pub struct MedicationRecordRepo;

impl MedicationRecordRepo {
    /// Decrement a detail's stock by `quantity`, never below zero.
    async fn consume_stock_with(
        conn: &mut PgConnection,
        medication_detail_id: DbId,
        quantity: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE medication_details
             SET remaining_quantity = GREATEST(remaining_quantity - $2, 0)
             WHERE id = $1",
        )
        .bind(medication_detail_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Insert a record, applying the stock decrement for `TAKEN`.
    ///
    /// `record_type` defaults to `TAKEN` and `record_date` to now.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMedicationRecord,
    ) -> Result<MedicationRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO medication_records
                (medication_detail_id, record_type, record_date, quantity_taken, notes,
                 effectiveness_score, tags)
             VALUES ($1, COALESCE($2, '{RECORD_TAKEN}'), COALESCE($3, NOW()), COALESCE($4, 0),
                     COALESCE($5, ''), $6, COALESCE($7, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, MedicationRecord>(&query)
            .bind(input.medication_detail_id)
            .bind(&input.record_type)
            .bind(input.record_date)
            .bind(input.quantity_taken)
            .bind(&input.notes)
            .bind(input.effectiveness_score)
            .bind(&input.tags)
            .fetch_one(&mut *tx)
            .await?;

        if consumes_stock(&record.record_type) {
            Self::consume_stock_with(&mut tx, record.medication_detail_id, record.quantity_taken)
                .await?;
        }

        tx.commit().await?;
        Ok(record)
    }

    /// Find a record by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MedicationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_records r {OWNER_JOIN}
             WHERE r.id = $1 AND mi.user_id = $2"
        );
        sqlx::query_as::<_, MedicationRecord>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the user's records matching `filter`, newest first.
    pub async fn list_filtered(
        pool: &PgPool,
        user_id: DbId,
        filter: &RecordFilter,
    ) -> Result<Vec<MedicationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM medication_records r {OWNER_JOIN}
             WHERE mi.user_id = $1
               AND r.record_date >= $2 AND r.record_date < $3
               AND ($4::BIGINT IS NULL OR g.id = $4)
               AND ($5::TEXT IS NULL OR r.record_type = $5)
               AND ($6::BIGINT IS NULL OR r.medication_detail_id = $6)
             ORDER BY r.record_date DESC, r.id DESC"
        );
        sqlx::query_as::<_, MedicationRecord>(&query)
            .bind(user_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.group_id)
            .bind(&filter.record_type)
            .bind(filter.medication_detail_id)
            .fetch_all(pool)
            .await
    }

    /// All records of one detail, newest first.
    pub async fn list_for_detail(
        pool: &PgPool,
        medication_detail_id: DbId,
    ) -> Result<Vec<MedicationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM medication_records
             WHERE medication_detail_id = $1
             ORDER BY record_date DESC, id DESC"
        );
        sqlx::query_as::<_, MedicationRecord>(&query)
            .bind(medication_detail_id)
            .fetch_all(pool)
            .await
    }

    /// Update a record. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateMedicationRecord,
    ) -> Result<Option<MedicationRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE medication_records r SET
                record_type = COALESCE($3, r.record_type),
                record_date = COALESCE($4, r.record_date),
                quantity_taken = COALESCE($5, r.quantity_taken),
                notes = COALESCE($6, r.notes),
                effectiveness_score = COALESCE($7, r.effectiveness_score),
                tags = COALESCE($8, r.tags)
             FROM medication_details d, medication_cycles c, medication_groups g,
                  user_medical_infos mi
             WHERE r.id = $1 AND d.id = r.medication_detail_id AND c.id = d.cycle_id
               AND g.id = c.group_id AND mi.id = g.medical_info_id AND mi.user_id = $2
             RETURNING {PREFIXED_COLUMNS}"
        );
        sqlx::query_as::<_, MedicationRecord>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.record_type)
            .bind(input.record_date)
            .bind(input.quantity_taken)
            .bind(&input.notes)
            .bind(input.effectiveness_score)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record. Stock is not restored.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM medication_records r
             USING medication_details d, medication_cycles c, medication_groups g,
                   user_medical_infos mi
             WHERE r.id = $1 AND d.id = r.medication_detail_id AND c.id = d.cycle_id
               AND g.id = c.group_id AND mi.id = g.medical_info_id AND mi.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Upsert the detail's record for the day `[day_start, day_end)`.
    ///
    /// An existing record for the day is overwritten with the check-in's
    /// type, quantity, notes and `now`. Otherwise a record is inserted and
    /// a `TAKEN` check-in consumes stock. The detail row is locked so that
    /// concurrent check-ins for the same detail serialize.
    pub async fn check_in(
        pool: &PgPool,
        input: &CheckIn,
        day_start: Timestamp,
        day_end: Timestamp,
        now: Timestamp,
    ) -> Result<CheckInOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM medication_details WHERE id = $1 FOR UPDATE")
            .bind(input.medication_detail_id)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM medication_records
             WHERE medication_detail_id = $1 AND record_date >= $2 AND record_date < $3
             ORDER BY record_date DESC, id DESC
             LIMIT 1",
        )
        .bind(input.medication_detail_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some(id) => {
                let query = format!(
                    "UPDATE medication_records SET
                        record_type = $2,
                        quantity_taken = $3,
                        notes = $4,
                        record_date = $5
                     WHERE id = $1
                     RETURNING {COLUMNS}"
                );
                let record = sqlx::query_as::<_, MedicationRecord>(&query)
                    .bind(id)
                    .bind(&input.record_type)
                    .bind(input.quantity_taken)
                    .bind(&input.notes)
                    .bind(now)
                    .fetch_one(&mut *tx)
                    .await?;
                CheckInOutcome {
                    record,
                    created: false,
                }
            }
            None => {
                let query = format!(
                    "INSERT INTO medication_records
                        (medication_detail_id, record_type, record_date, quantity_taken, notes)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING {COLUMNS}"
                );
                let record = sqlx::query_as::<_, MedicationRecord>(&query)
                    .bind(input.medication_detail_id)
                    .bind(&input.record_type)
                    .bind(now)
                    .bind(input.quantity_taken)
                    .bind(&input.notes)
                    .fetch_one(&mut *tx)
                    .await?;
                if consumes_stock(&record.record_type) {
                    Self::consume_stock_with(
                        &mut tx,
                        record.medication_detail_id,
                        record.quantity_taken,
                    )
                    .await?;
                }
                CheckInOutcome {
                    record,
                    created: true,
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Records of the user dated in `[from, to)` with their drug names,
    /// optionally narrowed to one group.
    pub async fn facts_for_user(
        pool: &PgPool,
        user_id: DbId,
        from: Timestamp,
        to: Timestamp,
        group_id: Option<DbId>,
    ) -> Result<Vec<RecordFactRow>, sqlx::Error> {
        sqlx::query_as::<_, RecordFactRow>(
            "SELECT r.record_type, r.record_date, m.item_name AS medication_name
             FROM medication_records r
             JOIN medication_details d ON d.id = r.medication_detail_id
             JOIN medication_cycles c ON c.id = d.cycle_id
             JOIN medication_groups g ON g.id = c.group_id
             JOIN user_medical_infos mi ON mi.id = g.medical_info_id
             JOIN prescription_medications pm ON pm.id = d.prescription_medication_id
             JOIN medications m ON m.item_seq = pm.medication_id
             WHERE mi.user_id = $1
               AND r.record_date >= $2 AND r.record_date < $3
               AND ($4::BIGINT IS NULL OR g.id = $4)
             ORDER BY r.record_date, r.id",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(group_id)
        .fetch_all(pool)
        .await
    }
}

fn consumes_stock(record_type: &str) -> bool {
    RecordType::from_str_value(record_type).is_ok_and(|t| t.consumes_stock())
}
