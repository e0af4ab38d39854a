//! Handlers for the `/prescription-medications` resource (prescription
//! line items).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::cycles::validate_duration_days;
use bokyak_core::dosage::validate_dosage_pattern;
use bokyak_core::types::DbId;
use bokyak_db::models::prescription_medication::{
    CreatePrescriptionMedication, PrescriptionMedication, UpdatePrescriptionMedication,
};
use bokyak_db::repositories::{MedicationGroupRepo, PrescriptionMedicationRepo, PrescriptionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::query::PrescriptionFilterParams;
use crate::response::ApiResponse;
use crate::state::AppState;

fn validate_line(
    pattern: Option<&serde_json::Value>,
    duration_days: Option<i32>,
    total_quantity: Option<f64>,
) -> AppResult<()> {
    if let Some(pattern) = pattern {
        validate_dosage_pattern(pattern).map_err(AppError::validation)?;
    }
    if let Some(days) = duration_days {
        validate_duration_days(days).map_err(AppError::validation)?;
    }
    if total_quantity.is_some_and(|q| !q.is_finite() || q < 0.0) {
        return Err(AppError::validation(
            "total_quantity must be a non-negative number",
        ));
    }
    Ok(())
}

async fn ensure_group(state: &AppState, user_id: DbId, group_id: Option<DbId>) -> AppResult<()> {
    if let Some(group_id) = group_id {
        let owner = MedicationGroupRepo::owner_id(&state.pool, group_id).await?;
        ensure_owner(owner, user_id, "MedicationGroup", group_id)?;
    }
    Ok(())
}

/// GET /api/v1/prescription-medications?prescription_id=
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PrescriptionFilterParams>,
) -> AppResult<ApiResponse<Vec<PrescriptionMedication>>> {
    let lines =
        PrescriptionMedicationRepo::list_for_user(&state.pool, auth.user_id, params.prescription_id)
            .await?;
    Ok(ApiResponse::ok(lines, "Prescription medications retrieved"))
}

/// POST /api/v1/prescription-medications
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePrescriptionMedication>,
) -> AppResult<ApiResponse<PrescriptionMedication>> {
    validate_line(
        Some(&input.standard_dosage_pattern),
        Some(input.duration_days),
        Some(input.total_quantity),
    )?;
    let owner = PrescriptionRepo::owner_id(&state.pool, input.prescription_id).await?;
    ensure_owner(owner, auth.user_id, "Prescription", input.prescription_id)?;
    ensure_group(&state, auth.user_id, input.group_id).await?;

    let line = PrescriptionMedicationRepo::create(&state.pool, &input).await?;
    Ok(ApiResponse::created(line, "Prescription medication created"))
}

/// GET /api/v1/prescription-medications/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<PrescriptionMedication>> {
    let line = PrescriptionMedicationRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("PrescriptionMedication", id))?;
    Ok(ApiResponse::ok(line, "Prescription medication retrieved"))
}

/// PUT /api/v1/prescription-medications/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePrescriptionMedication>,
) -> AppResult<ApiResponse<PrescriptionMedication>> {
    validate_line(
        input.standard_dosage_pattern.as_ref(),
        input.duration_days,
        input.total_quantity,
    )?;
    ensure_group(&state, auth.user_id, input.group_id).await?;

    let line = PrescriptionMedicationRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("PrescriptionMedication", id))?;
    Ok(ApiResponse::ok(line, "Prescription medication updated"))
}

/// DELETE /api/v1/prescription-medications/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        PrescriptionMedicationRepo::delete(&state.pool, id, auth.user_id).await?,
        "PrescriptionMedication",
        id,
    )
}
