//! Dosage pattern parsing, slot ordering and validation.
//!
//! A dosage pattern is a JSON object keyed by slot name:
//!
//! ```text
//! {"morning": {"enabled": true, "quantity": 1, "unit": "mg", "instructions": "after meal"}}
//! ```
//!
//! Only slots with `enabled: true` contribute to schedules and usage.
//! Unknown slot keys are preserved and sorted after the known ones.

use chrono::NaiveTime;
use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Slot names
// ---------------------------------------------------------------------------

pub const SLOT_MORNING: &str = "morning";
pub const SLOT_LUNCH: &str = "lunch";
pub const SLOT_EVENING: &str = "evening";
pub const SLOT_BEDTIME: &str = "bedtime";
pub const SLOT_PRN: &str = "prn";

/// Known slots in schedule order.
pub const KNOWN_SLOTS: &[&str] = &[SLOT_MORNING, SLOT_LUNCH, SLOT_EVENING, SLOT_BEDTIME, SLOT_PRN];

/// Priority assigned to slot keys outside [`KNOWN_SLOTS`].
pub const UNKNOWN_SLOT_PRIORITY: u8 = 99;

pub const DEFAULT_QUANTITY: f64 = 1.0;
pub const DEFAULT_UNIT: &str = "mg";

// ---------------------------------------------------------------------------
// Slot windows
// ---------------------------------------------------------------------------

/// Local-hour window during which a slot's dose is expected (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub slot: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SlotWindow {
    /// Whether `hour` falls anywhere in the window.
    pub fn contains(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }

    /// Whether `hour` falls in the window with one hour trimmed from each edge.
    pub fn is_on_time(&self, hour: u32) -> bool {
        hour > self.start_hour && hour < self.end_hour
    }
}

/// Timed slots in chronological order. `prn` (as needed) has no window.
pub const SLOT_WINDOWS: &[SlotWindow] = &[
    SlotWindow { slot: SLOT_MORNING, start_hour: 6, end_hour: 10 },
    SlotWindow { slot: SLOT_LUNCH, start_hour: 11, end_hour: 14 },
    SlotWindow { slot: SLOT_EVENING, start_hour: 17, end_hour: 20 },
    SlotWindow { slot: SLOT_BEDTIME, start_hour: 21, end_hour: 23 },
];

/// Look up the window for a timed slot.
pub fn slot_window(slot: &str) -> Option<&'static SlotWindow> {
    SLOT_WINDOWS.iter().find(|w| w.slot == slot)
}

/// Time of day at which renewal creates the default DOSAGE alert for a slot.
pub fn default_alert_time(slot: &str) -> Option<NaiveTime> {
    let hour = match slot {
        SLOT_MORNING => 8,
        SLOT_LUNCH => 12,
        SLOT_EVENING => 18,
        SLOT_BEDTIME => 22,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, 0, 0)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Fixed display priority of a slot: morning=1 .. prn=5, unknown=99.
pub fn slot_priority(slot: &str) -> u8 {
    match slot {
        SLOT_MORNING => 1,
        SLOT_LUNCH => 2,
        SLOT_EVENING => 3,
        SLOT_BEDTIME => 4,
        SLOT_PRN => 5,
        _ => UNKNOWN_SLOT_PRIORITY,
    }
}

/// Sort slot names by priority, breaking ties alphabetically.
pub fn sort_slots(slots: &mut [String]) {
    slots.sort_by(|a, b| {
        slot_priority(a)
            .cmp(&slot_priority(b))
            .then_with(|| a.cmp(b))
    });
}

// ---------------------------------------------------------------------------
// Pattern parsing
// ---------------------------------------------------------------------------

/// One enabled slot of a dosage pattern with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotDose {
    pub slot: String,
    pub quantity: f64,
    pub unit: String,
    pub instructions: String,
}

/// Pick the pattern that governs a detail: the patient's actual pattern when
/// set and non-null, otherwise the prescribed standard pattern.
pub fn effective_pattern<'a>(actual: Option<&'a Value>, standard: &'a Value) -> &'a Value {
    match actual {
        Some(v) if !v.is_null() => v,
        _ => standard,
    }
}

/// Extract enabled slots from a pattern, sorted by slot priority.
///
/// Non-object patterns and non-object slot values yield nothing.
pub fn enabled_slots(pattern: &Value) -> Vec<SlotDose> {
    let Some(obj) = pattern.as_object() else {
        return Vec::new();
    };

    let mut doses: Vec<SlotDose> = obj
        .iter()
        .filter(|(_, v)| v.get("enabled").and_then(Value::as_bool) == Some(true))
        .map(|(slot, v)| SlotDose {
            slot: slot.clone(),
            quantity: v
                .get("quantity")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_QUANTITY),
            unit: v
                .get("unit")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_UNIT)
                .to_string(),
            instructions: v
                .get("instructions")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect();

    doses.sort_by(|a, b| {
        slot_priority(&a.slot)
            .cmp(&slot_priority(&b.slot))
            .then_with(|| a.slot.cmp(&b.slot))
    });
    doses
}

/// Scheduled quantity per day: the sum of enabled slot quantities,
/// excluding as-needed (`prn`) doses.
pub fn daily_usage(pattern: &Value) -> f64 {
    enabled_slots(pattern)
        .iter()
        .filter(|d| d.slot != SLOT_PRN)
        .map(|d| d.quantity)
        .sum()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the structure of a dosage pattern.
pub fn validate_dosage_pattern(pattern: &Value) -> Result<(), String> {
    let obj = pattern
        .as_object()
        .ok_or_else(|| "Dosage pattern must be a JSON object".to_string())?;

    for (slot, value) in obj {
        let entry = value
            .as_object()
            .ok_or_else(|| format!("Dosage slot '{slot}' must be a JSON object"))?;

        if let Some(enabled) = entry.get("enabled") {
            if !enabled.is_boolean() {
                return Err(format!("Dosage slot '{slot}': 'enabled' must be a boolean"));
            }
        }
        if let Some(quantity) = entry.get("quantity") {
            match quantity.as_f64() {
                Some(q) if q >= 0.0 => {}
                _ => {
                    return Err(format!(
                        "Dosage slot '{slot}': 'quantity' must be a non-negative number"
                    ))
                }
            }
        }
        for key in ["unit", "instructions"] {
            if let Some(v) = entry.get(key) {
                if !v.is_string() {
                    return Err(format!("Dosage slot '{slot}': '{key}' must be a string"));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priorities_follow_day_order() {
        assert!(slot_priority("morning") < slot_priority("lunch"));
        assert!(slot_priority("bedtime") < slot_priority("prn"));
        assert_eq!(slot_priority("afternoon_snack"), UNKNOWN_SLOT_PRIORITY);
    }

    #[test]
    fn sort_slots_puts_unknown_last_alphabetically() {
        let mut slots: Vec<String> = ["zeta", "bedtime", "alpha", "morning", "prn"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_slots(&mut slots);
        assert_eq!(slots, vec!["morning", "bedtime", "prn", "alpha", "zeta"]);
    }

    #[test]
    fn enabled_slots_applies_defaults() {
        let pattern = json!({
            "evening": {"enabled": true},
            "morning": {"enabled": true, "quantity": 2, "unit": "tablet", "instructions": "after meal"},
            "lunch": {"enabled": false, "quantity": 1},
        });
        let doses = enabled_slots(&pattern);
        assert_eq!(doses.len(), 2);
        assert_eq!(doses[0].slot, "morning");
        assert_eq!(doses[0].quantity, 2.0);
        assert_eq!(doses[0].unit, "tablet");
        assert_eq!(doses[1].slot, "evening");
        assert_eq!(doses[1].quantity, DEFAULT_QUANTITY);
        assert_eq!(doses[1].unit, DEFAULT_UNIT);
        assert_eq!(doses[1].instructions, "");
    }

    #[test]
    fn enabled_slots_ignores_non_object_pattern() {
        assert!(enabled_slots(&json!([1, 2])).is_empty());
        assert!(enabled_slots(&Value::Null).is_empty());
    }

    #[test]
    fn effective_pattern_prefers_actual() {
        let standard = json!({"morning": {"enabled": true}});
        let actual = json!({"evening": {"enabled": true}});
        assert_eq!(effective_pattern(Some(&actual), &standard), &actual);
        assert_eq!(effective_pattern(Some(&Value::Null), &standard), &standard);
        assert_eq!(effective_pattern(None, &standard), &standard);
    }

    #[test]
    fn daily_usage_skips_prn() {
        let pattern = json!({
            "morning": {"enabled": true, "quantity": 1},
            "evening": {"enabled": true, "quantity": 0.5},
            "prn": {"enabled": true, "quantity": 4},
        });
        assert_eq!(daily_usage(&pattern), 1.5);
    }

    #[test]
    fn validation_rejects_malformed_patterns() {
        assert!(validate_dosage_pattern(&json!({"morning": {"enabled": true, "quantity": 1}})).is_ok());
        assert!(validate_dosage_pattern(&json!({})).is_ok());
        assert!(validate_dosage_pattern(&json!("morning")).is_err());
        assert!(validate_dosage_pattern(&json!({"morning": true})).is_err());
        assert!(validate_dosage_pattern(&json!({"morning": {"enabled": "yes"}})).is_err());
        assert!(validate_dosage_pattern(&json!({"morning": {"quantity": -1}})).is_err());
        assert!(validate_dosage_pattern(&json!({"morning": {"unit": 5}})).is_err());
    }

    #[test]
    fn windows_and_on_time_edges() {
        let morning = slot_window("morning").unwrap();
        assert!(morning.contains(6) && morning.contains(10));
        assert!(!morning.contains(11));
        assert!(!morning.is_on_time(6));
        assert!(morning.is_on_time(7) && morning.is_on_time(9));
        assert!(!morning.is_on_time(10));
        assert!(slot_window("prn").is_none());
    }

    #[test]
    fn default_alert_times() {
        assert_eq!(default_alert_time("morning"), NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(default_alert_time("bedtime"), NaiveTime::from_hms_opt(22, 0, 0));
        assert_eq!(default_alert_time("prn"), None);
    }
}
