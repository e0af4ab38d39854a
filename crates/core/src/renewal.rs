//! Validation and planning for prescription renewal.
//!
//! Renewal replaces a patient's prescription with a new one and builds the
//! group, cycle, details and default reminders that go with it. The database
//! layer executes the plan inside one transaction; this module decides what
//! the plan contains.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cycles::validate_duration_days;
use crate::dosage::{self, validate_dosage_pattern};
use crate::types::ItemSeq;

/// Maximum length of a medication group name.
pub const MAX_GROUP_NAME_LENGTH: usize = 50;

/// One medication line of a new prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedication {
    pub medication_id: ItemSeq,
    pub dosage_pattern: Value,
    pub duration_days: i32,
    pub total_quantity: f64,
}

/// Validate the medication lines of a prescription.
///
/// When `require_any` is set an empty list is rejected.
pub fn validate_prescribed_medications(
    medications: &[PrescribedMedication],
    require_any: bool,
) -> Result<(), String> {
    if require_any && medications.is_empty() {
        return Err("At least one medication is required".to_string());
    }

    let mut seen = HashSet::new();
    for med in medications {
        if !seen.insert(med.medication_id) {
            return Err(format!(
                "Medication {} appears more than once",
                med.medication_id
            ));
        }
        validate_duration_days(med.duration_days)
            .map_err(|e| format!("Medication {}: {e}", med.medication_id))?;
        if !med.total_quantity.is_finite() || med.total_quantity < 0.0 {
            return Err(format!(
                "Medication {}: total_quantity must be a non-negative number",
                med.medication_id
            ));
        }
        validate_dosage_pattern(&med.dosage_pattern)
            .map_err(|e| format!("Medication {}: {e}", med.medication_id))?;
    }
    Ok(())
}

/// Validate a medication group name (1..=50 characters after trimming).
pub fn validate_group_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Group name must not be empty".to_string());
    }
    if len > MAX_GROUP_NAME_LENGTH {
        return Err(format!(
            "Group name must be at most {MAX_GROUP_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Name given to the group created by a renewal when none is supplied.
pub fn default_group_name(prescription_date: NaiveDate) -> String {
    format!("Medication group {prescription_date}")
}

/// A DOSAGE reminder created alongside a renewed detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAlert {
    pub slot: String,
    pub alert_time: NaiveTime,
}

/// One reminder per enabled timed slot of the pattern. As-needed and
/// unknown slots get no reminder.
pub fn default_alerts(pattern: &Value) -> Vec<PlannedAlert> {
    dosage::enabled_slots(pattern)
        .into_iter()
        .filter_map(|dose| {
            dosage::default_alert_time(&dose.slot).map(|alert_time| PlannedAlert {
                slot: dose.slot,
                alert_time,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn med(id: ItemSeq, duration: i32, quantity: f64) -> PrescribedMedication {
        PrescribedMedication {
            medication_id: id,
            dosage_pattern: json!({"morning": {"enabled": true, "quantity": 1}}),
            duration_days: duration,
            total_quantity: quantity,
        }
    }

    #[test]
    fn empty_list_rejected_only_when_required() {
        assert!(validate_prescribed_medications(&[], true).is_err());
        assert!(validate_prescribed_medications(&[], false).is_ok());
    }

    #[test]
    fn duplicate_medication_rejected() {
        let err = validate_prescribed_medications(&[med(1, 7, 7.0), med(1, 14, 14.0)], true)
            .unwrap_err();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn bad_duration_and_quantity_rejected() {
        assert!(validate_prescribed_medications(&[med(1, 0, 7.0)], true).is_err());
        assert!(validate_prescribed_medications(&[med(1, i32::MAX, 7.0)], true).is_err());
        assert!(validate_prescribed_medications(&[med(1, 7, -1.0)], true).is_err());
        assert!(validate_prescribed_medications(&[med(1, 7, 0.0)], true).is_ok());
    }

    #[test]
    fn bad_pattern_rejected() {
        let mut m = med(1, 7, 7.0);
        m.dosage_pattern = json!(["morning"]);
        let err = validate_prescribed_medications(&[m], true).unwrap_err();
        assert!(err.starts_with("Medication 1:"));
    }

    #[test]
    fn group_name_bounds() {
        assert!(validate_group_name("Hypertension").is_ok());
        assert!(validate_group_name("   ").is_err());
        assert!(validate_group_name(&"x".repeat(51)).is_err());
        assert!(validate_group_name(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn default_name_includes_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(default_group_name(date), "Medication group 2026-03-15");
    }

    #[test]
    fn default_alerts_follow_enabled_timed_slots() {
        let pattern = json!({
            "morning": {"enabled": true},
            "lunch": {"enabled": false},
            "bedtime": {"enabled": true},
            "prn": {"enabled": true},
        });
        let alerts = default_alerts(&pattern);
        let slots: Vec<&str> = alerts.iter().map(|a| a.slot.as_str()).collect();
        assert_eq!(slots, vec!["morning", "bedtime"]);
        assert_eq!(alerts[0].alert_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(alerts[1].alert_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
    }
}
