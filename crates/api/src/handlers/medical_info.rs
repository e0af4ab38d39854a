//! Handlers for the `/medical-info` resource: the (hospital, illness) pairs
//! a patient is treated for.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::types::{Date, DbId};
use bokyak_db::models::medical_info::{
    CreateMedicalInfo, MedicalInfoView, RegisteredVisit, UpdateMedicalInfo, UserMedicalInfo,
};
use bokyak_db::repositories::{HospitalRepo, IllnessRepo, MedicalInfoRepo, PrescriptionRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::query::{non_blank, MedicalInfoSearchParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /medical-info/register-visit`.
#[derive(Debug, Deserialize)]
pub struct RegisterVisitRequest {
    pub hospital_id: DbId,
    pub illness_id: DbId,
    /// Defaults to today.
    pub prescription_date: Option<Date>,
}

/// 404 unless the hospital and illness both belong to the caller.
pub(crate) async fn ensure_hospital_and_illness(
    state: &AppState,
    user_id: DbId,
    hospital_id: DbId,
    illness_id: DbId,
) -> AppResult<()> {
    HospitalRepo::find_by_id(&state.pool, hospital_id, user_id)
        .await?
        .ok_or(AppError::not_found("Hospital", hospital_id))?;
    IllnessRepo::find_by_id(&state.pool, illness_id, user_id)
        .await?
        .ok_or(AppError::not_found("Illness", illness_id))?;
    Ok(())
}

/// GET /api/v1/medical-info
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicalInfoView>>> {
    let infos = MedicalInfoRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(infos, "Medical info retrieved"))
}

/// POST /api/v1/medical-info
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMedicalInfo>,
) -> AppResult<ApiResponse<UserMedicalInfo>> {
    ensure_hospital_and_illness(&state, auth.user_id, input.hospital_id, input.illness_id).await?;
    if let Some(prescription_id) = input.prescription_id {
        let owner = PrescriptionRepo::owner_id(&state.pool, prescription_id).await?;
        ensure_owner(owner, auth.user_id, "Prescription", prescription_id)?;
    }
    let info = MedicalInfoRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok(ApiResponse::created(info, "Medical info created"))
}

/// GET /api/v1/medical-info/search?hospital_name=&illness_name=
pub async fn search(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MedicalInfoSearchParams>,
) -> AppResult<ApiResponse<Vec<MedicalInfoView>>> {
    let infos = MedicalInfoRepo::search(
        &state.pool,
        auth.user_id,
        non_blank(params.hospital_name.as_deref()),
        non_blank(params.illness_name.as_deref()),
    )
    .await?;
    Ok(ApiResponse::ok(infos, "Medical info retrieved"))
}

/// POST /api/v1/medical-info/register-visit
///
/// Reuse or create the medical info for the hospital and illness, and attach
/// a new empty prescription to it.
pub async fn register_visit(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RegisterVisitRequest>,
) -> AppResult<ApiResponse<RegisteredVisit>> {
    ensure_hospital_and_illness(&state, auth.user_id, input.hospital_id, input.illness_id).await?;
    let date = input.prescription_date.unwrap_or_else(|| state.clock.today());
    let visit = MedicalInfoRepo::register_visit(
        &state.pool,
        auth.user_id,
        input.hospital_id,
        input.illness_id,
        date,
    )
    .await?;
    tracing::info!(
        user_id = auth.user_id,
        medical_info_id = visit.medical_info_id,
        prescription_id = visit.prescription_id,
        "Hospital visit registered",
    );
    Ok(ApiResponse::created(visit, "Visit registered"))
}

/// GET /api/v1/medical-info/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<MedicalInfoView>> {
    let info = MedicalInfoRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicalInfo", id))?;
    Ok(ApiResponse::ok(info, "Medical info retrieved"))
}

/// PUT /api/v1/medical-info/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMedicalInfo>,
) -> AppResult<ApiResponse<UserMedicalInfo>> {
    if let Some(prescription_id) = input.prescription_id {
        let owner = PrescriptionRepo::owner_id(&state.pool, prescription_id).await?;
        ensure_owner(owner, auth.user_id, "Prescription", prescription_id)?;
    }
    let info = MedicalInfoRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("MedicalInfo", id))?;
    Ok(ApiResponse::ok(info, "Medical info updated"))
}

/// DELETE /api/v1/medical-info/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        MedicalInfoRepo::delete(&state.pool, id, auth.user_id).await?,
        "MedicalInfo",
        id,
    )
}
