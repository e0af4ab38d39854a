//! Main-ingredient catalogue and drug composition.

use bokyak_core::ingredients::{display_name, full_density_info};
use bokyak_core::types::{DbId, ItemSeq, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::medication::Medication;

/// A row from the `main_ingredients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MainIngredient {
    pub ingr_code: String,
    pub original_code: String,
    pub dosage_form_code: String,
    pub dosage_form: String,
    pub main_ingr_name_kr: String,
    pub main_ingr_name_en: String,
    pub classification_code: Option<i32>,
    pub administration_route: String,
    pub main_ingr_density: f64,
    pub main_ingr_unit: String,
    pub original_density_text: String,
    pub is_combination: bool,
    pub combination_group: String,
    pub is_active: bool,
    pub notes: String,
    pub data_quality_score: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An ingredient with its derived display fields.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
    #[serde(flatten)]
    pub ingredient: MainIngredient,
    pub display_name: String,
    pub full_density_info: String,
}

impl From<MainIngredient> for IngredientView {
    fn from(ingredient: MainIngredient) -> Self {
        Self {
            display_name: display_name(
                &ingredient.main_ingr_name_kr,
                &ingredient.main_ingr_name_en,
                &ingredient.original_code,
            ),
            full_density_info: full_density_info(
                ingredient.main_ingr_density,
                &ingredient.main_ingr_unit,
                &ingredient.original_density_text,
            ),
            ingredient,
        }
    }
}

/// DTO for registering an ingredient. `ingr_code`, the combination flag
/// and the quality score are derived.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateIngredient {
    pub original_code: String,
    pub dosage_form_code: Option<String>,
    pub dosage_form: Option<String>,
    pub main_ingr_name_kr: Option<String>,
    pub main_ingr_name_en: Option<String>,
    pub classification_code: Option<i32>,
    pub administration_route: Option<String>,
    pub main_ingr_density: Option<f64>,
    pub main_ingr_unit: Option<String>,
    pub original_density_text: Option<String>,
    pub combination_group: Option<String>,
    pub notes: Option<String>,
}

/// DTO for adding an ingredient to a drug's composition.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkIngredient {
    pub ingredient_code: String,
    pub content_amount: f64,
    pub content_unit: String,
    pub is_active_ingredient: Option<bool>,
}

/// One ingredient of a drug, joined with the ingredient's names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MedicationIngredientView {
    pub id: DbId,
    pub medication_id: ItemSeq,
    pub ingredient_code: String,
    pub content_amount: f64,
    pub content_unit: String,
    pub is_active_ingredient: bool,
    #[serde(skip)]
    pub main_ingr_name_kr: String,
    #[serde(skip)]
    pub main_ingr_name_en: String,
    #[serde(skip)]
    pub original_code: String,
}

impl MedicationIngredientView {
    pub fn ingredient_name(&self) -> String {
        display_name(
            &self.main_ingr_name_kr,
            &self.main_ingr_name_en,
            &self.original_code,
        )
    }
}

/// A composition line as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientDetail {
    #[serde(flatten)]
    pub line: MedicationIngredientView,
    pub ingredient_name: String,
}

/// A drug with its composition.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationWithIngredients {
    #[serde(flatten)]
    pub medication: Medication,
    pub ingredient_details: Vec<IngredientDetail>,
    /// Display names of the active ingredients only.
    pub main_ingredient_names: Vec<String>,
}

impl MedicationWithIngredients {
    pub fn new(medication: Medication, lines: Vec<MedicationIngredientView>) -> Self {
        let main_ingredient_names = lines
            .iter()
            .filter(|l| l.is_active_ingredient)
            .map(MedicationIngredientView::ingredient_name)
            .collect();
        let ingredient_details = lines
            .into_iter()
            .map(|line| IngredientDetail {
                ingredient_name: line.ingredient_name(),
                line,
            })
            .collect();
        Self {
            medication,
            ingredient_details,
            main_ingredient_names,
        }
    }
}
