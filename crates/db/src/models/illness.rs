//! Illness entity model and DTOs.

use bokyak_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `illnesses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Illness {
    pub id: DbId,
    pub illness_code: String,
    pub user_id: DbId,
    pub ill_type: String,
    pub ill_name: String,
    pub ill_code: Option<String>,
    pub ill_start: Option<Date>,
    pub ill_end: Option<Date>,
    pub is_chronic: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating (or upserting) an illness. `ill_type` defaults to `DISEASE`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIllness {
    pub ill_type: Option<String>,
    pub ill_name: String,
    pub ill_code: Option<String>,
    pub ill_start: Option<Date>,
    pub ill_end: Option<Date>,
    pub is_chronic: Option<bool>,
}

/// DTO for updating an illness. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIllness {
    pub ill_type: Option<String>,
    pub ill_name: Option<String>,
    pub ill_code: Option<String>,
    pub ill_start: Option<Date>,
    pub ill_end: Option<Date>,
    pub is_chronic: Option<bool>,
}
