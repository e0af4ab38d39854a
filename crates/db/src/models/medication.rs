//! Drug reference model and DTOs.

use bokyak_core::schedule::MedicationSummary;
use bokyak_core::types::{ItemSeq, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `medications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Medication {
    pub item_seq: ItemSeq,
    pub item_name: String,
    pub entp_name: String,
    pub item_image: Option<String>,
    pub class_name: Option<String>,
    pub dosage_form: Option<String>,
    pub is_prescription: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Medication {
    /// Fields shown next to a scheduled dose.
    pub fn summary(&self) -> MedicationSummary {
        MedicationSummary {
            item_seq: self.item_seq,
            item_name: self.item_name.clone(),
            entp_name: self.entp_name.clone(),
            item_image: self.item_image.clone(),
            class_name: self.class_name.clone(),
            dosage_form: self.dosage_form.clone(),
            is_prescription: self.is_prescription,
        }
    }
}

/// DTO for registering a drug.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedication {
    pub item_seq: ItemSeq,
    pub item_name: String,
    pub entp_name: Option<String>,
    pub item_image: Option<String>,
    pub class_name: Option<String>,
    pub dosage_form: Option<String>,
    pub is_prescription: Option<bool>,
}

/// DTO for updating a drug. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedication {
    pub item_name: Option<String>,
    pub entp_name: Option<String>,
    pub item_image: Option<String>,
    pub class_name: Option<String>,
    pub dosage_form: Option<String>,
    pub is_prescription: Option<bool>,
}
