//! Prescription renewal input and outcome.

use bokyak_core::renewal::PrescribedMedication;
use bokyak_core::types::{Date, DbId};
use serde::{Deserialize, Serialize};

/// Input for renewing (or starting) a patient's prescription.
#[derive(Debug, Clone, Deserialize)]
pub struct RenewPrescription {
    pub hospital_id: DbId,
    pub illness_id: DbId,
    pub old_prescription_id: Option<DbId>,
    pub prescription_date: Date,
    pub group_name: Option<String>,
    pub medications: Vec<PrescribedMedication>,
}

/// Identifiers of everything a renewal created.
#[derive(Debug, Clone, Serialize)]
pub struct RenewalOutcome {
    pub prescription_id: DbId,
    pub prescription_code: String,
    pub group_id: DbId,
    pub group_code: String,
    pub cycle_id: DbId,
    pub medical_info_id: DbId,
    pub detail_ids: Vec<DbId>,
    pub alert_count: usize,
}
