//! Medication alert model and DTOs.

use bokyak_core::types::{DbId, Timestamp};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `medication_alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationAlert {
    pub id: DbId,
    pub medication_detail_id: DbId,
    pub alert_type: String,
    pub alert_time: NaiveTime,
    pub is_active: bool,
    pub message: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an alert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicationAlert {
    pub medication_detail_id: DbId,
    pub alert_type: String,
    pub alert_time: NaiveTime,
    pub is_active: Option<bool>,
    pub message: Option<String>,
}

/// DTO for updating an alert. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedicationAlert {
    pub alert_type: Option<String>,
    pub alert_time: Option<NaiveTime>,
    pub is_active: Option<bool>,
    pub message: Option<String>,
}

/// Per-user count of DOSAGE alerts due at a given minute.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    pub user_id: DbId,
    pub medication_count: i64,
}
