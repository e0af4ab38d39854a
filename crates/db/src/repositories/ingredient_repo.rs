//! Repository for the `main_ingredients` catalogue and drug composition.

use bokyak_core::ingredients::{
    data_quality_score, ingredient_code, QualityInputs, DEFAULT_CONTENT_UNIT,
    INGREDIENT_SEARCH_LIMIT,
};
use bokyak_core::types::ItemSeq;
use sqlx::PgPool;

use crate::models::ingredient::{
    CreateIngredient, LinkIngredient, MainIngredient, MedicationIngredientView,
};

const COLUMNS: &str = "ingr_code, original_code, dosage_form_code, dosage_form, \
                        main_ingr_name_kr, main_ingr_name_en, classification_code, \
                        administration_route, main_ingr_density, main_ingr_unit, \
                        original_density_text, is_combination, combination_group, is_active, \
                        notes, data_quality_score, created_at, updated_at";

/// Catalogue order: most complete first, then by name.
const CATALOGUE_ORDER: &str = "data_quality_score DESC, main_ingr_name_kr, main_ingr_name_en, ingr_code";

const COMPOSITION_SELECT: &str = "SELECT mi.id, mi.medication_id, mi.ingredient_code, \
                                         mi.content_amount, mi.content_unit, \
                                         mi.is_active_ingredient, i.main_ingr_name_kr, \
                                         i.main_ingr_name_en, i.original_code
                                  FROM medication_ingredients mi
                                  JOIN main_ingredients i ON i.ingr_code = mi.ingredient_code";

/// Provides catalogue reads, registration and drug composition.
pub struct IngredientRepo;

impl IngredientRepo {
    /// Register an ingredient.
    ///
    /// The code and quality score are derived from the input, the
    /// combination group defaults to `original_code`, and every active row
    /// sharing the `original_code` is flagged as a combination once there
    /// is more than one.
    pub async fn create(
        pool: &PgPool,
        input: &CreateIngredient,
    ) -> Result<MainIngredient, sqlx::Error> {
        let original_code = input.original_code.trim();
        let name_kr = input.main_ingr_name_kr.as_deref().unwrap_or("");
        let name_en = input.main_ingr_name_en.as_deref().unwrap_or("");
        let unit = input.main_ingr_unit.as_deref().unwrap_or(DEFAULT_CONTENT_UNIT);
        let density = input.main_ingr_density.unwrap_or(0.0);
        let score = data_quality_score(&QualityInputs {
            name_kr,
            name_en,
            density,
            unit,
            dosage_form: input.dosage_form.as_deref().unwrap_or(""),
            classification_code: input.classification_code,
        });
        let group = input
            .combination_group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(original_code);

        let mut tx = pool.begin().await?;

        let code = sqlx::query_scalar::<_, String>(
            "INSERT INTO main_ingredients
                (ingr_code, original_code, dosage_form_code, dosage_form, main_ingr_name_kr,
                 main_ingr_name_en, classification_code, administration_route,
                 main_ingr_density, main_ingr_unit, original_density_text,
                 combination_group, notes, data_quality_score)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, ''), $5, $6, $7, COALESCE($8, ''),
                     $9, $10, COALESCE($11, ''), $12, COALESCE($13, ''), $14)
             RETURNING ingr_code",
        )
        .bind(ingredient_code(original_code, name_kr, name_en))
        .bind(original_code)
        .bind(&input.dosage_form_code)
        .bind(&input.dosage_form)
        .bind(name_kr)
        .bind(name_en)
        .bind(input.classification_code)
        .bind(&input.administration_route)
        .bind(density)
        .bind(unit)
        .bind(&input.original_density_text)
        .bind(group)
        .bind(&input.notes)
        .bind(score)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE main_ingredients SET is_combination =
                (SELECT COUNT(*) FROM main_ingredients WHERE original_code = $1) > 1
             WHERE original_code = $1",
        )
        .bind(original_code)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM main_ingredients WHERE ingr_code = $1");
        let ingredient = sqlx::query_as::<_, MainIngredient>(&query)
            .bind(&code)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ingredient)
    }

    /// Find an active ingredient by code.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<MainIngredient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM main_ingredients WHERE ingr_code = $1 AND is_active = true"
        );
        sqlx::query_as::<_, MainIngredient>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// All active ingredients in catalogue order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<MainIngredient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM main_ingredients WHERE is_active = true ORDER BY {CATALOGUE_ORDER}"
        );
        sqlx::query_as::<_, MainIngredient>(&query)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search on either name, at most
    /// [`INGREDIENT_SEARCH_LIMIT`] rows.
    pub async fn search(pool: &PgPool, name: &str) -> Result<Vec<MainIngredient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM main_ingredients
             WHERE is_active = true
               AND (main_ingr_name_kr ILIKE '%' || $1 || '%'
                    OR main_ingr_name_en ILIKE '%' || $1 || '%')
             ORDER BY {CATALOGUE_ORDER}
             LIMIT $2"
        );
        sqlx::query_as::<_, MainIngredient>(&query)
            .bind(name)
            .bind(INGREDIENT_SEARCH_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// The other active members of `ingredient`'s combination group.
    /// Empty for a single-ingredient product.
    pub async fn combinations(
        pool: &PgPool,
        ingredient: &MainIngredient,
    ) -> Result<Vec<MainIngredient>, sqlx::Error> {
        if !ingredient.is_combination {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM main_ingredients
             WHERE combination_group = $1 AND is_active = true AND ingr_code <> $2
             ORDER BY main_ingr_name_kr, main_ingr_name_en, ingr_code"
        );
        sqlx::query_as::<_, MainIngredient>(&query)
            .bind(&ingredient.combination_group)
            .bind(&ingredient.ingr_code)
            .fetch_all(pool)
            .await
    }

    /// Add an ingredient to a drug's composition.
    pub async fn link_medication(
        pool: &PgPool,
        item_seq: ItemSeq,
        input: &LinkIngredient,
    ) -> Result<MedicationIngredientView, sqlx::Error> {
        let query = format!(
            "WITH inserted AS (
                INSERT INTO medication_ingredients
                    (medication_id, ingredient_code, content_amount, content_unit,
                     is_active_ingredient)
                VALUES ($1, $2, $3, $4, COALESCE($5, true))
                RETURNING *
             )
             {}",
            COMPOSITION_SELECT.replace("medication_ingredients mi", "inserted mi")
        );
        sqlx::query_as::<_, MedicationIngredientView>(&query)
            .bind(item_seq)
            .bind(&input.ingredient_code)
            .bind(input.content_amount)
            .bind(input.content_unit.trim())
            .bind(input.is_active_ingredient)
            .fetch_one(pool)
            .await
    }

    /// A drug's composition, active ingredients first.
    pub async fn list_for_medication(
        pool: &PgPool,
        item_seq: ItemSeq,
    ) -> Result<Vec<MedicationIngredientView>, sqlx::Error> {
        let query = format!(
            "{COMPOSITION_SELECT}
             WHERE mi.medication_id = $1
             ORDER BY mi.is_active_ingredient DESC, mi.id"
        );
        sqlx::query_as::<_, MedicationIngredientView>(&query)
            .bind(item_seq)
            .fetch_all(pool)
            .await
    }
}
