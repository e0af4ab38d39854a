//! Illness classification.

use serde::{Deserialize, Serialize};

pub const ILL_DISEASE: &str = "DISEASE";
pub const ILL_SYMPTOM: &str = "SYMPTOM";

/// All valid illness type strings (stored in DB).
pub const VALID_ILL_TYPES: &[&str] = &[ILL_DISEASE, ILL_SYMPTOM];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IllnessType {
    Disease,
    Symptom,
}

impl IllnessType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ILL_DISEASE => Ok(Self::Disease),
            ILL_SYMPTOM => Ok(Self::Symptom),
            _ => Err(format!(
                "Invalid illness type '{s}'. Must be one of: {}",
                VALID_ILL_TYPES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disease => ILL_DISEASE,
            Self::Symptom => ILL_SYMPTOM,
        }
    }
}
