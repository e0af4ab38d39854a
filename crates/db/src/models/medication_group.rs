//! Medication group model and DTOs.

use bokyak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `medication_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationGroup {
    pub id: DbId,
    pub group_code: String,
    pub medical_info_id: DbId,
    pub prescription_id: Option<DbId>,
    pub group_name: String,
    pub reminder_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicationGroup {
    pub medical_info_id: DbId,
    pub prescription_id: Option<DbId>,
    pub group_name: String,
    pub reminder_enabled: Option<bool>,
}

/// DTO for updating a group. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedicationGroup {
    pub prescription_id: Option<DbId>,
    pub group_name: Option<String>,
    pub reminder_enabled: Option<bool>,
}
