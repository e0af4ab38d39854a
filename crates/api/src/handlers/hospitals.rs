//! Handlers for the `/hospitals` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::types::DbId;
use bokyak_db::models::hospital::{CreateHospital, Hospital, UpdateHospital};
use bokyak_db::repositories::HospitalRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, require_text};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

fn validate_create(input: &CreateHospital) -> AppResult<()> {
    require_text(&input.hosp_code, "hosp_code")?;
    require_text(&input.hosp_name, "hosp_name")
}

/// GET /api/v1/hospitals
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Hospital>>> {
    let hospitals = HospitalRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(hospitals, "Hospitals retrieved"))
}

/// POST /api/v1/hospitals
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateHospital>,
) -> AppResult<ApiResponse<Hospital>> {
    validate_create(&input)?;
    let hospital = HospitalRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok(ApiResponse::created(hospital, "Hospital created"))
}

/// POST /api/v1/hospitals/save
///
/// Insert, or update the caller's hospital with the same `hosp_code`.
pub async fn save(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateHospital>,
) -> AppResult<ApiResponse<Hospital>> {
    validate_create(&input)?;
    let hospital = HospitalRepo::upsert(&state.pool, auth.user_id, &input).await?;
    Ok(ApiResponse::ok(hospital, "Hospital saved"))
}

/// GET /api/v1/hospitals/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Hospital>> {
    let hospital = HospitalRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("Hospital", id))?;
    Ok(ApiResponse::ok(hospital, "Hospital retrieved"))
}

/// PUT /api/v1/hospitals/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHospital>,
) -> AppResult<ApiResponse<Hospital>> {
    if let Some(name) = &input.hosp_name {
        require_text(name, "hosp_name")?;
    }
    let hospital = HospitalRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("Hospital", id))?;
    Ok(ApiResponse::ok(hospital, "Hospital updated"))
}

/// DELETE /api/v1/hospitals/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        HospitalRepo::delete(&state.pool, id, auth.user_id).await?,
        "Hospital",
        id,
    )
}
