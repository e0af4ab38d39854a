//! Prescription line items.

use bokyak_core::types::{DbId, ItemSeq, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prescription_medications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrescriptionMedication {
    pub id: DbId,
    pub prescription_id: DbId,
    pub group_id: Option<DbId>,
    pub medication_id: ItemSeq,
    pub standard_dosage_pattern: serde_json::Value,
    pub duration_days: i32,
    pub total_quantity: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a medication to a prescription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrescriptionMedication {
    pub prescription_id: DbId,
    pub group_id: Option<DbId>,
    pub medication_id: ItemSeq,
    pub standard_dosage_pattern: serde_json::Value,
    pub duration_days: i32,
    pub total_quantity: f64,
}

/// DTO for updating a prescription line. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePrescriptionMedication {
    pub group_id: Option<DbId>,
    pub standard_dosage_pattern: Option<serde_json::Value>,
    pub duration_days: Option<i32>,
    pub total_quantity: Option<f64>,
}
