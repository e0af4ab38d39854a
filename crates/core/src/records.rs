//! Medication intake record types and validation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const RECORD_TAKEN: &str = "TAKEN";
pub const RECORD_MISSED: &str = "MISSED";
pub const RECORD_SIDE_EFFECT: &str = "SIDE_EFFECT";
pub const RECORD_SKIPPED: &str = "SKIPPED";
pub const RECORD_NOTE: &str = "NOTE";

/// All valid record type strings (stored in DB).
pub const VALID_RECORD_TYPES: &[&str] = &[
    RECORD_TAKEN,
    RECORD_MISSED,
    RECORD_SIDE_EFFECT,
    RECORD_SKIPPED,
    RECORD_NOTE,
];

/// Record types accepted by the daily check-in. Free-form notes go through
/// the plain record endpoint instead.
pub const CHECK_IN_RECORD_TYPES: &[&str] = &[
    RECORD_TAKEN,
    RECORD_MISSED,
    RECORD_SKIPPED,
    RECORD_SIDE_EFFECT,
];

pub const MIN_EFFECTIVENESS_SCORE: i16 = 1;
pub const MAX_EFFECTIVENESS_SCORE: i16 = 10;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to a dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Taken,
    Missed,
    SideEffect,
    Skipped,
    Note,
}

impl RecordType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            RECORD_TAKEN => Ok(Self::Taken),
            RECORD_MISSED => Ok(Self::Missed),
            RECORD_SIDE_EFFECT => Ok(Self::SideEffect),
            RECORD_SKIPPED => Ok(Self::Skipped),
            RECORD_NOTE => Ok(Self::Note),
            _ => Err(format!(
                "Invalid record type '{s}'. Must be one of: {}",
                VALID_RECORD_TYPES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taken => RECORD_TAKEN,
            Self::Missed => RECORD_MISSED,
            Self::SideEffect => RECORD_SIDE_EFFECT,
            Self::Skipped => RECORD_SKIPPED,
            Self::Note => RECORD_NOTE,
        }
    }

    /// Whether inserting a record of this type consumes stock.
    pub fn consumes_stock(&self) -> bool {
        matches!(self, Self::Taken)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Parse a record type accepted by the daily check-in.
pub fn parse_check_in_type(s: &str) -> Result<RecordType, String> {
    if !CHECK_IN_RECORD_TYPES.contains(&s) {
        return Err(format!(
            "Invalid record type '{s}'. Must be one of: {}",
            CHECK_IN_RECORD_TYPES.join(", ")
        ));
    }
    RecordType::from_str_value(s)
}

/// Validate an optional effectiveness score (1..=10).
pub fn validate_effectiveness_score(score: Option<i16>) -> Result<(), String> {
    match score {
        Some(s) if !(MIN_EFFECTIVENESS_SCORE..=MAX_EFFECTIVENESS_SCORE).contains(&s) => Err(
            format!(
                "Effectiveness score must be between {MIN_EFFECTIVENESS_SCORE} and {MAX_EFFECTIVENESS_SCORE}, got {s}"
            ),
        ),
        _ => Ok(()),
    }
}

/// Validate a taken quantity (non-negative, finite).
pub fn validate_quantity_taken(quantity: f64) -> Result<(), String> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(format!(
            "Quantity taken must be a non-negative number, got {quantity}"
        ));
    }
    Ok(())
}

/// Remaining stock after taking `quantity`, floored at zero.
pub fn remaining_after_intake(remaining: f64, quantity: f64) -> f64 {
    (remaining - quantity).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn record_type_round_trip() {
        for s in VALID_RECORD_TYPES {
            let rt = RecordType::from_str_value(s).unwrap();
            assert_eq!(rt.as_str(), *s);
        }
    }

    #[test]
    fn record_type_invalid() {
        let err = RecordType::from_str_value("TAKEN_LATE").unwrap_err();
        assert!(err.contains("Invalid record type"));
    }

    #[test]
    fn record_type_serializes_as_db_string() {
        let json = serde_json::to_string(&RecordType::SideEffect).unwrap();
        assert_eq!(json, "\"SIDE_EFFECT\"");
    }

    #[test]
    fn only_taken_consumes_stock() {
        assert!(RecordType::Taken.consumes_stock());
        assert!(!RecordType::Missed.consumes_stock());
        assert!(!RecordType::SideEffect.consumes_stock());
    }

    #[test]
    fn check_in_rejects_notes() {
        assert_matches!(parse_check_in_type("SKIPPED"), Ok(RecordType::Skipped));
        assert!(parse_check_in_type("NOTE").is_err());
    }

    #[test]
    fn effectiveness_score_bounds() {
        assert!(validate_effectiveness_score(None).is_ok());
        assert!(validate_effectiveness_score(Some(1)).is_ok());
        assert!(validate_effectiveness_score(Some(10)).is_ok());
        assert!(validate_effectiveness_score(Some(0)).is_err());
        assert!(validate_effectiveness_score(Some(11)).is_err());
    }

    #[test]
    fn quantity_must_be_non_negative() {
        assert!(validate_quantity_taken(0.0).is_ok());
        assert!(validate_quantity_taken(-1.0).is_err());
        assert!(validate_quantity_taken(f64::NAN).is_err());
    }

    #[test]
    fn intake_floors_at_zero() {
        assert_eq!(remaining_after_intake(10.0, 3.0), 7.0);
        assert_eq!(remaining_after_intake(2.0, 5.0), 0.0);
    }
}
