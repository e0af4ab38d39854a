//! Prescription entity model and DTOs.

use bokyak_core::renewal::PrescribedMedication;
use bokyak_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prescriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prescription {
    pub id: DbId,
    pub prescription_code: String,
    pub user_id: DbId,
    pub prescription_count: i32,
    pub prescription_date: Date,
    pub previous_prescription_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a prescription. The owner comes from auth.
///
/// `prescription_count` is derived from the previous prescription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrescription {
    pub prescription_date: Date,
    pub previous_prescription_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// DTO for updating a prescription. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePrescription {
    pub prescription_date: Option<Date>,
    pub is_active: Option<bool>,
}

/// DTO for superseding a prescription with a successor.
#[derive(Debug, Clone, Deserialize)]
pub struct SupersedePrescription {
    pub prescription_date: Option<Date>,
    #[serde(default)]
    pub medications: Vec<PrescribedMedication>,
}

/// DTO for one prescription shared by several medical infos.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSharedPrescription {
    pub prescription_date: Date,
    pub medical_info_ids: Vec<DbId>,
    #[serde(default)]
    pub medications: Vec<PrescribedMedication>,
}
