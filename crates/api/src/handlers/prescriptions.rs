//! Handlers for the `/prescriptions` resource, including renewal,
//! supersession and prescriptions shared by several medical infos.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::cycles::cycle_end_for;
use bokyak_core::renewal::{validate_group_name, validate_prescribed_medications};
use bokyak_core::types::DbId;
use bokyak_db::models::prescription::{
    CreatePrescription, CreateSharedPrescription, Prescription, SupersedePrescription,
    UpdatePrescription,
};
use bokyak_db::models::renewal::{RenewPrescription, RenewalOutcome};
use bokyak_db::repositories::{MedicalInfoRepo, PrescriptionRepo, RenewalRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::medical_info::ensure_hospital_and_illness;
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/prescriptions
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Prescription>>> {
    let prescriptions = PrescriptionRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(prescriptions, "Prescriptions retrieved"))
}

/// GET /api/v1/prescriptions/active
pub async fn list_active(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Prescription>>> {
    let prescriptions = PrescriptionRepo::list_active(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(prescriptions, "Active prescriptions retrieved"))
}

/// POST /api/v1/prescriptions
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePrescription>,
) -> AppResult<ApiResponse<Prescription>> {
    if let Some(previous_id) = input.previous_prescription_id {
        let owner = PrescriptionRepo::owner_id(&state.pool, previous_id).await?;
        ensure_owner(owner, auth.user_id, "Prescription", previous_id)?;
    }
    let prescription = PrescriptionRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok(ApiResponse::created(prescription, "Prescription created"))
}

/// GET /api/v1/prescriptions/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Prescription>> {
    let prescription = PrescriptionRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("Prescription", id))?;
    Ok(ApiResponse::ok(prescription, "Prescription retrieved"))
}

/// PUT /api/v1/prescriptions/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePrescription>,
) -> AppResult<ApiResponse<Prescription>> {
    let prescription = PrescriptionRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("Prescription", id))?;
    Ok(ApiResponse::ok(prescription, "Prescription updated"))
}

/// DELETE /api/v1/prescriptions/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        PrescriptionRepo::delete(&state.pool, id, auth.user_id).await?,
        "Prescription",
        id,
    )
}

/// POST /api/v1/prescriptions/{id}/supersede
///
/// Deactivate the prescription and replace it with a successor dated
/// `prescription_date` (default today). Groups and medical infos follow the
/// successor.
pub async fn supersede(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SupersedePrescription>,
) -> AppResult<ApiResponse<Prescription>> {
    validate_prescribed_medications(&input.medications, false).map_err(AppError::validation)?;

    let date = input
        .prescription_date
        .unwrap_or_else(|| state.clock.today());
    let successor =
        PrescriptionRepo::supersede(&state.pool, id, auth.user_id, date, &input.medications)
            .await?
            .ok_or(AppError::not_found("Prescription", id))?;

    tracing::info!(
        user_id = auth.user_id,
        old_prescription_id = id,
        prescription_id = successor.id,
        "Prescription superseded",
    );
    Ok(ApiResponse::created(successor, "Prescription superseded"))
}

/// POST /api/v1/prescriptions/shared
///
/// One prescription linked to several of the caller's medical infos, all at
/// the same hospital.
pub async fn create_shared(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateSharedPrescription>,
) -> AppResult<ApiResponse<Prescription>> {
    input.medical_info_ids.sort_unstable();
    input.medical_info_ids.dedup();
    if input.medical_info_ids.is_empty() {
        return Err(AppError::validation("At least one medical_info_id is required"));
    }
    validate_prescribed_medications(&input.medications, false).map_err(AppError::validation)?;

    let infos =
        MedicalInfoRepo::find_many(&state.pool, &input.medical_info_ids, auth.user_id).await?;
    if let Some(missing) = input
        .medical_info_ids
        .iter()
        .find(|id| !infos.iter().any(|info| info.id == **id))
    {
        return Err(AppError::not_found("MedicalInfo", *missing));
    }
    let hospital_id = infos[0].hospital_id;
    if infos.iter().any(|info| info.hospital_id != hospital_id) {
        return Err(AppError::validation(
            "A shared prescription requires medical infos at the same hospital",
        ));
    }

    let prescription = PrescriptionRepo::create_shared(&state.pool, auth.user_id, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        prescription_id = prescription.id,
        medical_infos = infos.len(),
        "Shared prescription created",
    );
    Ok(ApiResponse::created(prescription, "Shared prescription created"))
}

/// POST /api/v1/prescriptions/renew
///
/// Atomically retire the old prescription and build the new prescription,
/// group, cycle, details and default reminders.
pub async fn renew(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RenewPrescription>,
) -> AppResult<ApiResponse<RenewalOutcome>> {
    validate_prescribed_medications(&input.medications, true).map_err(AppError::validation)?;
    if let Some(name) = &input.group_name {
        validate_group_name(name).map_err(AppError::validation)?;
    }

    ensure_hospital_and_illness(&state, auth.user_id, input.hospital_id, input.illness_id).await?;
    if let Some(old_id) = input.old_prescription_id {
        PrescriptionRepo::find_by_id(&state.pool, old_id, auth.user_id)
            .await?
            .ok_or(AppError::not_found("Prescription", old_id))?;
    }

    let cycle_end = cycle_end_for(
        input.prescription_date,
        input.medications.iter().map(|m| m.duration_days),
    )
    .map_err(AppError::validation)?;

    let outcome = RenewalRepo::renew(
        &state.pool,
        auth.user_id,
        &input,
        cycle_end,
        state.clock.today(),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        prescription_id = outcome.prescription_id,
        group_id = outcome.group_id,
        cycle_id = outcome.cycle_id,
        details = outcome.detail_ids.len(),
        alerts = outcome.alert_count,
        "Prescription renewed",
    );
    Ok(ApiResponse::created(outcome, "Prescription renewed"))
}
