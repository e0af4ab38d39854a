//! Hospital entity model and DTOs.

use bokyak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `hospitals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hospital {
    pub id: DbId,
    pub hospital_code: String,
    pub user_id: DbId,
    pub hosp_code: String,
    pub hosp_name: String,
    pub hosp_type: String,
    pub doctor_name: String,
    pub address: String,
    pub phone_number: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating (or upserting) a hospital. The owner comes from auth.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHospital {
    pub hosp_code: String,
    pub hosp_name: String,
    pub hosp_type: Option<String>,
    pub doctor_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// DTO for updating a hospital. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateHospital {
    pub hosp_name: Option<String>,
    pub hosp_type: Option<String>,
    pub doctor_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}
