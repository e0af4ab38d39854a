//! Handlers for the `/illnesses` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::illness::IllnessType;
use bokyak_core::types::{Date, DbId};
use bokyak_db::models::illness::{CreateIllness, Illness, UpdateIllness};
use bokyak_db::repositories::IllnessRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, require_text};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

fn validate_fields(
    ill_type: Option<&str>,
    ill_start: Option<Date>,
    ill_end: Option<Date>,
) -> AppResult<()> {
    if let Some(t) = ill_type {
        IllnessType::from_str_value(t).map_err(AppError::validation)?;
    }
    if let (Some(start), Some(end)) = (ill_start, ill_end) {
        if end < start {
            return Err(AppError::validation("ill_end must not be before ill_start"));
        }
    }
    Ok(())
}

fn validate_create(input: &CreateIllness) -> AppResult<()> {
    require_text(&input.ill_name, "ill_name")?;
    validate_fields(input.ill_type.as_deref(), input.ill_start, input.ill_end)
}

/// GET /api/v1/illnesses
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Illness>>> {
    let illnesses = IllnessRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(illnesses, "Illnesses retrieved"))
}

/// POST /api/v1/illnesses
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIllness>,
) -> AppResult<ApiResponse<Illness>> {
    validate_create(&input)?;
    let illness = IllnessRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok(ApiResponse::created(illness, "Illness created"))
}

/// POST /api/v1/illnesses/save
///
/// Insert, or update the caller's illness with the same name and type.
pub async fn save(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIllness>,
) -> AppResult<ApiResponse<Illness>> {
    validate_create(&input)?;
    let illness = IllnessRepo::upsert(&state.pool, auth.user_id, &input).await?;
    Ok(ApiResponse::ok(illness, "Illness saved"))
}

/// GET /api/v1/illnesses/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Illness>> {
    let illness = IllnessRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("Illness", id))?;
    Ok(ApiResponse::ok(illness, "Illness retrieved"))
}

/// PUT /api/v1/illnesses/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIllness>,
) -> AppResult<ApiResponse<Illness>> {
    if let Some(name) = &input.ill_name {
        require_text(name, "ill_name")?;
    }
    validate_fields(input.ill_type.as_deref(), input.ill_start, input.ill_end)?;
    let illness = IllnessRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("Illness", id))?;
    Ok(ApiResponse::ok(illness, "Illness updated"))
}

/// DELETE /api/v1/illnesses/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        IllnessRepo::delete(&state.pool, id, auth.user_id).await?,
        "Illness",
        id,
    )
}
