//! Handlers for the main-ingredient catalogue (`/ingredients`).
//!
//! Any authenticated caller may read; registration requires the admin role.

use axum::extract::{Path, Query, State};
use axum::Json;
use bokyak_core::ingredients::validate_ingredient;
use bokyak_db::models::ingredient::{CreateIngredient, IngredientView, MainIngredient};
use bokyak_db::repositories::IngredientRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{non_blank, NameSearchParams};
use crate::response::ApiResponse;
use crate::state::AppState;

fn views(rows: Vec<MainIngredient>) -> Vec<IngredientView> {
    rows.into_iter().map(IngredientView::from).collect()
}

/// GET /api/v1/ingredients
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<IngredientView>>> {
    let rows = IngredientRepo::list_active(&state.pool).await?;
    Ok(ApiResponse::ok(views(rows), "Ingredients retrieved"))
}

/// GET /api/v1/ingredients/search?name=
pub async fn search(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<NameSearchParams>,
) -> AppResult<ApiResponse<Vec<IngredientView>>> {
    let name = non_blank(params.name.as_deref())
        .ok_or_else(|| AppError::validation("name is required"))?;
    let rows = IngredientRepo::search(&state.pool, name).await?;
    Ok(ApiResponse::ok(views(rows), "Ingredients retrieved"))
}

/// GET /api/v1/ingredients/{code}
pub async fn get_by_code(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<IngredientView>> {
    let ingredient = IngredientRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::not_found_code("Ingredient", &code))?;
    Ok(ApiResponse::ok(ingredient.into(), "Ingredient retrieved"))
}

/// GET /api/v1/ingredients/{code}/combinations
pub async fn combinations(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<Vec<IngredientView>>> {
    let ingredient = IngredientRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::not_found_code("Ingredient", &code))?;
    let rows = IngredientRepo::combinations(&state.pool, &ingredient).await?;
    Ok(ApiResponse::ok(views(rows), "Combination ingredients retrieved"))
}

/// POST /api/v1/ingredients
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateIngredient>,
) -> AppResult<ApiResponse<IngredientView>> {
    validate_ingredient(&input.original_code, input.main_ingr_density)
        .map_err(AppError::validation)?;
    let ingredient = IngredientRepo::create(&state.pool, &input).await?;
    tracing::info!(
        ingr_code = %ingredient.ingr_code,
        user_id = admin.user_id,
        "Ingredient registered"
    );
    Ok(ApiResponse::created(ingredient.into(), "Ingredient created"))
}
