//! Medication cycle model and DTOs.

use bokyak_core::cycles::CycleSnapshot;
use bokyak_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `medication_cycles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationCycle {
    pub id: DbId,
    pub group_id: DbId,
    pub cycle_number: i32,
    pub cycle_start: Date,
    pub cycle_end: Option<Date>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a cycle. `cycle_number` defaults to the group's next number.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicationCycle {
    pub group_id: DbId,
    pub cycle_number: Option<i32>,
    pub cycle_start: Date,
    pub cycle_end: Option<Date>,
    pub is_active: Option<bool>,
}

/// DTO for updating a cycle. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedicationCycle {
    pub cycle_start: Option<Date>,
    pub cycle_end: Option<Date>,
    pub is_active: Option<bool>,
}

/// Active cycle joined with its group and hospital for the expiration check.
#[derive(Debug, Clone, FromRow)]
pub struct CycleExpirationRow {
    pub cycle_id: DbId,
    pub group_id: DbId,
    pub group_name: String,
    pub cycle_end: Option<Date>,
    pub hospital_name: String,
    pub prescription_id: Option<DbId>,
}

impl From<CycleExpirationRow> for CycleSnapshot {
    fn from(row: CycleExpirationRow) -> Self {
        Self {
            cycle_id: row.cycle_id,
            group_id: row.group_id,
            group_name: row.group_name,
            cycle_end: row.cycle_end,
            hospital_name: row.hospital_name,
            prescription_id: row.prescription_id,
        }
    }
}
