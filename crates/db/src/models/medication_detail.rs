//! Medication detail model, DTOs and joined read models.

use bokyak_core::dosage::effective_pattern;
use bokyak_core::schedule::{DayRecord, GroupCycle, MedicationSummary, ScheduledDetail};
use bokyak_core::types::{DbId, ItemSeq, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row from the `medication_details` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationDetail {
    pub id: DbId,
    pub cycle_id: DbId,
    pub prescription_medication_id: DbId,
    pub actual_dosage_pattern: Option<serde_json::Value>,
    pub remaining_quantity: f64,
    pub patient_adjustments: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a detail. `remaining_quantity` defaults to the
/// prescription line's `total_quantity`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicationDetail {
    pub cycle_id: DbId,
    pub prescription_medication_id: DbId,
    pub actual_dosage_pattern: Option<serde_json::Value>,
    pub remaining_quantity: Option<f64>,
    pub patient_adjustments: Option<serde_json::Value>,
}

/// DTO for updating a detail. All fields are optional.
///
/// `actual_dosage_pattern: null` clears the override so the standard
/// pattern applies again; an absent field keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMedicationDetail {
    #[serde(default, deserialize_with = "present")]
    pub actual_dosage_pattern: Option<Option<serde_json::Value>>,
    pub remaining_quantity: Option<f64>,
    pub patient_adjustments: Option<serde_json::Value>,
}

/// Wraps any present value, `null` included, so it survives as `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<serde_json::Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_json::Value>::deserialize(deserializer).map(Some)
}

/// Detail joined with its drug, group and hospital.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationDetailView {
    pub id: DbId,
    pub cycle_id: DbId,
    pub prescription_medication_id: DbId,
    pub actual_dosage_pattern: Option<serde_json::Value>,
    pub standard_dosage_pattern: serde_json::Value,
    pub remaining_quantity: f64,
    pub patient_adjustments: serde_json::Value,
    pub medication_id: ItemSeq,
    pub medication_name: String,
    pub group_id: DbId,
    pub group_name: String,
    pub hospital_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MedicationDetailView {
    /// The pattern in force: actual when set, standard otherwise.
    pub fn dosage_pattern(&self) -> &serde_json::Value {
        effective_pattern(
            self.actual_dosage_pattern.as_ref(),
            &self.standard_dosage_pattern,
        )
    }
}

/// One detail of a group's selected cycle with its record for the day.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub group_id: DbId,
    pub group_code: String,
    pub group_name: String,
    pub cycle_id: DbId,
    pub cycle_number: i32,
    pub medication_detail_id: DbId,
    pub actual_dosage_pattern: Option<serde_json::Value>,
    pub standard_dosage_pattern: serde_json::Value,
    pub item_seq: ItemSeq,
    pub item_name: String,
    pub entp_name: String,
    pub item_image: Option<String>,
    pub class_name: Option<String>,
    pub dosage_form: Option<String>,
    pub is_prescription: bool,
    pub record_type: Option<String>,
    pub record_date: Option<Timestamp>,
}

/// Fold rows ordered by group into the schedule builder's input.
pub fn group_schedule_rows(rows: Vec<ScheduleRow>) -> Vec<GroupCycle> {
    let mut groups: Vec<GroupCycle> = Vec::new();

    for row in rows {
        let day_record = match (row.record_type, row.record_date) {
            (Some(record_type), Some(record_date)) => Some(DayRecord {
                record_type,
                record_date,
            }),
            _ => None,
        };
        let dosage_pattern = effective_pattern(
            row.actual_dosage_pattern.as_ref(),
            &row.standard_dosage_pattern,
        )
        .clone();
        let detail = ScheduledDetail {
            medication_detail_id: row.medication_detail_id,
            medication: MedicationSummary {
                item_seq: row.item_seq,
                item_name: row.item_name,
                entp_name: row.entp_name,
                item_image: row.item_image,
                class_name: row.class_name,
                dosage_form: row.dosage_form,
                is_prescription: row.is_prescription,
            },
            dosage_pattern,
            day_record,
        };

        match groups.last_mut() {
            Some(group) if group.group_id == row.group_id => group.details.push(detail),
            _ => groups.push(GroupCycle {
                group_id: row.group_id,
                group_code: row.group_code,
                group_name: row.group_name,
                cycle_id: row.cycle_id,
                cycle_number: row.cycle_number,
                details: vec![detail],
            }),
        }
    }

    groups
}

/// Users with details running low, for the refill reminder job.
#[derive(Debug, Clone, FromRow)]
pub struct RefillCandidate {
    pub user_id: DbId,
    pub low_stock_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_pattern_clears_and_absent_keeps() {
        let cleared: UpdateMedicationDetail =
            serde_json::from_value(json!({ "actual_dosage_pattern": null })).unwrap();
        assert_eq!(cleared.actual_dosage_pattern, Some(None));

        let kept: UpdateMedicationDetail =
            serde_json::from_value(json!({ "remaining_quantity": 4.0 })).unwrap();
        assert_eq!(kept.actual_dosage_pattern, None);

        let set: UpdateMedicationDetail = serde_json::from_value(json!({
            "actual_dosage_pattern": {"morning": {"enabled": true}}
        }))
        .unwrap();
        assert_eq!(
            set.actual_dosage_pattern,
            Some(Some(json!({"morning": {"enabled": true}})))
        );
    }
}
