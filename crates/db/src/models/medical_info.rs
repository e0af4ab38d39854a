//! User medical info: the (hospital, illness) pairs a patient is treated for.

use bokyak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_medical_infos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserMedicalInfo {
    pub id: DbId,
    pub user_id: DbId,
    pub hospital_id: DbId,
    pub illness_id: DbId,
    pub prescription_id: Option<DbId>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Medical info joined with the hospital and illness names for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicalInfoView {
    pub id: DbId,
    pub user_id: DbId,
    pub hospital_id: DbId,
    pub hospital_name: String,
    pub illness_id: DbId,
    pub illness_name: String,
    pub illness_type: String,
    pub prescription_id: Option<DbId>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a medical info. The owner comes from auth.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicalInfo {
    pub hospital_id: DbId,
    pub illness_id: DbId,
    pub prescription_id: Option<DbId>,
    pub is_primary: Option<bool>,
}

/// DTO for updating a medical info. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedicalInfo {
    pub prescription_id: Option<DbId>,
    pub is_primary: Option<bool>,
}

/// Result of registering a hospital visit.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredVisit {
    pub medical_info_id: DbId,
    pub prescription_id: DbId,
    pub prescription_code: String,
}
