//! Medication alert types.

use serde::{Deserialize, Serialize};

pub const ALERT_DOSAGE: &str = "DOSAGE";
pub const ALERT_REFILL: &str = "REFILL";
pub const ALERT_APPOINTMENT: &str = "APPOINTMENT";

/// All valid alert type strings (stored in DB).
pub const VALID_ALERT_TYPES: &[&str] = &[ALERT_DOSAGE, ALERT_REFILL, ALERT_APPOINTMENT];

/// Message attached to alerts created during prescription renewal.
pub const DEFAULT_DOSAGE_MESSAGE: &str = "Time to take your medication.";

/// Window, in minutes, for the upcoming-alerts listing.
pub const UPCOMING_WINDOW_MINS: i64 = 60;

/// Kind of reminder an alert produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Dosage,
    Refill,
    Appointment,
}

impl AlertType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ALERT_DOSAGE => Ok(Self::Dosage),
            ALERT_REFILL => Ok(Self::Refill),
            ALERT_APPOINTMENT => Ok(Self::Appointment),
            _ => Err(format!(
                "Invalid alert type '{s}'. Must be one of: {}",
                VALID_ALERT_TYPES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dosage => ALERT_DOSAGE,
            Self::Refill => ALERT_REFILL,
            Self::Appointment => ALERT_APPOINTMENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_type_round_trip() {
        for s in VALID_ALERT_TYPES {
            assert_eq!(AlertType::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn alert_type_invalid() {
        assert!(AlertType::from_str_value("dosage").is_err());
    }
}
