//! Main-ingredient catalogue rules.
//!
//! Ingredients come from the national drug price master. Several rows can
//! share one `original_code`, in which case each of them is part of a
//! combination product.

use sha2::{Digest, Sha256};

/// Maximum rows returned by an ingredient name search.
pub const INGREDIENT_SEARCH_LIMIT: i64 = 20;

/// Maximum length of the registry's generic-name code.
pub const MAX_ORIGINAL_CODE_LENGTH: usize = 12;

/// Unit assumed when none is supplied.
pub const DEFAULT_CONTENT_UNIT: &str = "mg";

/// Hex characters of the name hash appended to `original_code`.
const CODE_HASH_LENGTH: usize = 8;

/// Stable identifier of an ingredient: the registry code plus a short hash
/// of both names, so combination members of one code stay distinct.
pub fn ingredient_code(original_code: &str, name_kr: &str, name_en: &str) -> String {
    let digest = Sha256::digest(format!("{original_code}_{name_kr}_{name_en}").as_bytes());
    let hash = format!("{digest:x}");
    format!("{original_code}_{}", &hash[..CODE_HASH_LENGTH])
}

/// The fields that feed [`data_quality_score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityInputs<'a> {
    pub name_kr: &'a str,
    pub name_en: &'a str,
    pub density: f64,
    pub unit: &'a str,
    pub dosage_form: &'a str,
    pub classification_code: Option<i32>,
}

/// Completeness score in `0..=100`.
///
/// Korean name 30, English name 20, content 25, a unit other than the
/// default 10, dosage form 10, classification 5.
pub fn data_quality_score(inputs: &QualityInputs<'_>) -> i32 {
    let mut score = 0;
    if !inputs.name_kr.is_empty() {
        score += 30;
    }
    if !inputs.name_en.is_empty() {
        score += 20;
    }
    if inputs.density > 0.0 {
        score += 25;
    }
    if !inputs.unit.is_empty() && inputs.unit != DEFAULT_CONTENT_UNIT {
        score += 10;
    }
    if !inputs.dosage_form.is_empty() {
        score += 10;
    }
    if inputs.classification_code.is_some_and(|c| c != 0) {
        score += 5;
    }
    score.min(100)
}

/// Name shown for an ingredient: Korean, then English, then the code.
pub fn display_name(name_kr: &str, name_en: &str, original_code: &str) -> String {
    if !name_kr.is_empty() {
        name_kr.to_string()
    } else if !name_en.is_empty() {
        name_en.to_string()
    } else {
        format!("Ingredient {original_code}")
    }
}

/// Human-readable content, falling back to the raw registry text.
pub fn full_density_info(density: f64, unit: &str, original_text: &str) -> String {
    if density > 0.0 {
        format!("{density}{unit}")
    } else if !original_text.is_empty() {
        original_text.to_string()
    } else {
        "No content information".to_string()
    }
}

/// Validate the registry code and content of a new ingredient.
pub fn validate_ingredient(original_code: &str, density: Option<f64>) -> Result<(), String> {
    let code = original_code.trim();
    if code.is_empty() {
        return Err("original_code must not be empty".to_string());
    }
    if code.chars().count() > MAX_ORIGINAL_CODE_LENGTH {
        return Err(format!(
            "original_code must be at most {MAX_ORIGINAL_CODE_LENGTH} characters"
        ));
    }
    if density.is_some_and(|d| !d.is_finite() || d < 0.0) {
        return Err("main_ingr_density must be a non-negative number".to_string());
    }
    Ok(())
}

/// Validate the content of an ingredient within one medication.
pub fn validate_content(amount: f64, unit: &str) -> Result<(), String> {
    if !amount.is_finite() || amount < 0.0 {
        return Err("content_amount must be a non-negative number".to_string());
    }
    if unit.trim().is_empty() {
        return Err("content_unit must not be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_stable_and_name_sensitive() {
        let a = ingredient_code("101301ATB", "아세트아미노펜", "acetaminophen");
        assert_eq!(a, ingredient_code("101301ATB", "아세트아미노펜", "acetaminophen"));
        assert!(a.starts_with("101301ATB_"));
        assert_eq!(a.len(), "101301ATB_".len() + 8);

        let b = ingredient_code("101301ATB", "카페인", "caffeine");
        assert_ne!(a, b);
    }

    #[test]
    fn quality_score_weights() {
        assert_eq!(data_quality_score(&QualityInputs::default()), 0);

        let complete = QualityInputs {
            name_kr: "아세트아미노펜",
            name_en: "acetaminophen",
            density: 500.0,
            unit: "g",
            dosage_form: "tablet",
            classification_code: Some(114),
        };
        assert_eq!(data_quality_score(&complete), 100);

        let default_unit = QualityInputs {
            unit: DEFAULT_CONTENT_UNIT,
            ..complete
        };
        assert_eq!(data_quality_score(&default_unit), 90);

        let names_only = QualityInputs {
            name_kr: "카페인",
            name_en: "caffeine",
            ..QualityInputs::default()
        };
        assert_eq!(data_quality_score(&names_only), 50);
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(display_name("카페인", "caffeine", "X1"), "카페인");
        assert_eq!(display_name("", "caffeine", "X1"), "caffeine");
        assert_eq!(display_name("", "", "X1"), "Ingredient X1");
    }

    #[test]
    fn density_info_fallbacks() {
        assert_eq!(full_density_info(500.0, "mg", ""), "500mg");
        assert_eq!(full_density_info(0.0, "mg", "1.1g(55mg/mL)"), "1.1g(55mg/mL)");
        assert_eq!(full_density_info(0.0, "mg", ""), "No content information");
    }

    #[test]
    fn ingredient_validation() {
        assert!(validate_ingredient("101301ATB", Some(500.0)).is_ok());
        assert!(validate_ingredient("  ", None).is_err());
        assert!(validate_ingredient("1234567890123", None).is_err());
        assert!(validate_ingredient("101301ATB", Some(-1.0)).is_err());
        assert!(validate_ingredient("101301ATB", Some(f64::NAN)).is_err());
    }

    #[test]
    fn content_validation() {
        assert!(validate_content(500.0, "mg").is_ok());
        assert!(validate_content(-1.0, "mg").is_err());
        assert!(validate_content(1.0, " ").is_err());
    }
}
