//! Handlers for the drug reference (`/medications`).
//!
//! Any authenticated caller may read; writes require the admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::ingredients::validate_content;
use bokyak_core::types::ItemSeq;
use bokyak_db::models::ingredient::{
    IngredientDetail, LinkIngredient, MedicationWithIngredients,
};
use bokyak_db::models::medication::{CreateMedication, Medication, UpdateMedication};
use bokyak_db::repositories::{IngredientRepo, MedicationRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, require_text};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{non_blank, SearchParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/medications?search=
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<ApiResponse<Vec<Medication>>> {
    let medications =
        MedicationRepo::search(&state.pool, non_blank(params.search.as_deref())).await?;
    Ok(ApiResponse::ok(medications, "Medications retrieved"))
}

/// GET /api/v1/medications/{item_seq}
///
/// The drug with its composition.
pub async fn get_by_item_seq(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(item_seq): Path<ItemSeq>,
) -> AppResult<ApiResponse<MedicationWithIngredients>> {
    let medication = MedicationRepo::find_by_item_seq(&state.pool, item_seq)
        .await?
        .ok_or(AppError::not_found("Medication", item_seq))?;
    let lines = IngredientRepo::list_for_medication(&state.pool, item_seq).await?;
    Ok(ApiResponse::ok(
        MedicationWithIngredients::new(medication, lines),
        "Medication retrieved",
    ))
}

/// POST /api/v1/medications/{item_seq}/ingredients
pub async fn add_ingredient(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(item_seq): Path<ItemSeq>,
    Json(input): Json<LinkIngredient>,
) -> AppResult<ApiResponse<IngredientDetail>> {
    validate_content(input.content_amount, &input.content_unit).map_err(AppError::validation)?;
    if MedicationRepo::find_by_item_seq(&state.pool, item_seq)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Medication", item_seq));
    }
    if IngredientRepo::find_by_code(&state.pool, &input.ingredient_code)
        .await?
        .is_none()
    {
        return Err(AppError::not_found_code("Ingredient", &input.ingredient_code));
    }
    let line = IngredientRepo::link_medication(&state.pool, item_seq, &input).await?;
    tracing::info!(
        item_seq,
        ingredient_code = %line.ingredient_code,
        user_id = admin.user_id,
        "Ingredient added to medication"
    );
    Ok(ApiResponse::created(
        IngredientDetail {
            ingredient_name: line.ingredient_name(),
            line,
        },
        "Ingredient added",
    ))
}

/// POST /api/v1/medications
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateMedication>,
) -> AppResult<ApiResponse<Medication>> {
    require_text(&input.item_name, "item_name")?;
    if input.item_seq <= 0 {
        return Err(AppError::validation("item_seq must be positive"));
    }
    let medication = MedicationRepo::create(&state.pool, &input).await?;
    tracing::info!(item_seq = medication.item_seq, user_id = admin.user_id, "Medication registered");
    Ok(ApiResponse::created(medication, "Medication created"))
}

/// PUT /api/v1/medications/{item_seq}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(item_seq): Path<ItemSeq>,
    Json(input): Json<UpdateMedication>,
) -> AppResult<ApiResponse<Medication>> {
    if let Some(name) = &input.item_name {
        require_text(name, "item_name")?;
    }
    let medication = MedicationRepo::update(&state.pool, item_seq, &input)
        .await?
        .ok_or(AppError::not_found("Medication", item_seq))?;
    Ok(ApiResponse::ok(medication, "Medication updated"))
}

/// DELETE /api/v1/medications/{item_seq}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(item_seq): Path<ItemSeq>,
) -> AppResult<StatusCode> {
    deleted(
        MedicationRepo::delete(&state.pool, item_seq).await?,
        "Medication",
        item_seq,
    )
}
