//! Medication intake record model and DTOs.

use bokyak_core::analytics::RecordFact;
use bokyak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `medication_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationRecord {
    pub id: DbId,
    pub medication_detail_id: DbId,
    pub record_type: String,
    pub record_date: Timestamp,
    pub quantity_taken: f64,
    pub notes: String,
    pub effectiveness_score: Option<i16>,
    pub tags: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a record. `record_type` defaults to `TAKEN` and
/// `record_date` to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicationRecord {
    pub medication_detail_id: DbId,
    pub record_type: Option<String>,
    pub record_date: Option<Timestamp>,
    pub quantity_taken: Option<f64>,
    pub notes: Option<String>,
    pub effectiveness_score: Option<i16>,
    pub tags: Option<serde_json::Value>,
}

/// DTO for updating a record. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedicationRecord {
    pub record_type: Option<String>,
    pub record_date: Option<Timestamp>,
    pub quantity_taken: Option<f64>,
    pub notes: Option<String>,
    pub effectiveness_score: Option<i16>,
    pub tags: Option<serde_json::Value>,
}

/// The fields written by a daily check-in.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub medication_detail_id: DbId,
    pub record_type: String,
    pub quantity_taken: f64,
    pub notes: String,
}

/// Outcome of a daily check-in.
#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub record: MedicationRecord,
    /// `true` when a new record was inserted, `false` when today's record was updated.
    pub created: bool,
}

/// Filters for the record listing. Bounds are UTC instants.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub from: Timestamp,
    pub to: Timestamp,
    pub group_id: Option<DbId>,
    pub record_type: Option<String>,
    pub medication_detail_id: Option<DbId>,
}

/// Record joined with its drug name, for analytics.
#[derive(Debug, Clone, FromRow)]
pub struct RecordFactRow {
    pub record_type: String,
    pub record_date: Timestamp,
    pub medication_name: String,
}

impl From<RecordFactRow> for RecordFact {
    fn from(row: RecordFactRow) -> Self {
        Self {
            record_type: row.record_type,
            record_date: row.record_date,
            medication_name: row.medication_name,
        }
    }
}
