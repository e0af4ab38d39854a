//! Repository for the `medications` drug reference table.

use bokyak_core::types::ItemSeq;
use sqlx::PgPool;

use crate::models::medication::{CreateMedication, Medication, UpdateMedication};

const COLUMNS: &str = "item_seq, item_name, entp_name, item_image, class_name, dosage_form, \
                        is_prescription, created_at, updated_at";

/// Maximum rows returned by [`MedicationRepo::search`].
pub const SEARCH_LIMIT: i64 = 20;

/// Provides CRUD and search over registered drugs.
pub struct MedicationRepo;

impl MedicationRepo {
    /// Register a drug under its registry `item_seq`.
    pub async fn create(pool: &PgPool, input: &CreateMedication) -> Result<Medication, sqlx::Error> {
        let query = format!(
            "INSERT INTO medications
                (item_seq, item_name, entp_name, item_image, class_name, dosage_form, is_prescription)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Medication>(&query)
            .bind(input.item_seq)
            .bind(&input.item_name)
            .bind(&input.entp_name)
            .bind(&input.item_image)
            .bind(&input.class_name)
            .bind(&input.dosage_form)
            .bind(input.is_prescription)
            .fetch_one(pool)
            .await
    }

    /// Find a drug by its registry sequence number.
    pub async fn find_by_item_seq(
        pool: &PgPool,
        item_seq: ItemSeq,
    ) -> Result<Option<Medication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM medications WHERE item_seq = $1");
        sqlx::query_as::<_, Medication>(&query)
            .bind(item_seq)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive substring search on `item_name`, at most
    /// [`SEARCH_LIMIT`] rows. Without a term, the first drugs by name.
    pub async fn search(pool: &PgPool, term: Option<&str>) -> Result<Vec<Medication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM medications
             WHERE $1::TEXT IS NULL OR item_name ILIKE '%' || $1 || '%'
             ORDER BY item_name, item_seq
             LIMIT $2"
        );
        sqlx::query_as::<_, Medication>(&query)
            .bind(term)
            .bind(SEARCH_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Update a drug. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        item_seq: ItemSeq,
        input: &UpdateMedication,
    ) -> Result<Option<Medication>, sqlx::Error> {
        let query = format!(
            "UPDATE medications SET
                item_name = COALESCE($2, item_name),
                entp_name = COALESCE($3, entp_name),
                item_image = COALESCE($4, item_image),
                class_name = COALESCE($5, class_name),
                dosage_form = COALESCE($6, dosage_form),
                is_prescription = COALESCE($7, is_prescription)
             WHERE item_seq = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Medication>(&query)
            .bind(item_seq)
            .bind(&input.item_name)
            .bind(&input.entp_name)
            .bind(&input.item_image)
            .bind(&input.class_name)
            .bind(&input.dosage_form)
            .bind(input.is_prescription)
            .fetch_optional(pool)
            .await
    }

    /// Delete a drug. Fails with a foreign-key violation while prescribed.
    pub async fn delete(pool: &PgPool, item_seq: ItemSeq) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM medications WHERE item_seq = $1")
            .bind(item_seq)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
