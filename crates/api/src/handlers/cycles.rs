//! Handlers for the `/cycles` resource (medication cycles).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::cycles::{
    classify_expiration, validate_cycle_bounds, validate_warning_days, CycleSnapshot,
    ExpirationReport, DEFAULT_EXPIRATION_WARNING_DAYS,
};
use bokyak_core::types::DbId;
use bokyak_db::models::medication_cycle::{
    CreateMedicationCycle, MedicationCycle, UpdateMedicationCycle,
};
use bokyak_db::repositories::{MedicationCycleRepo, MedicationGroupRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::query::{GroupFilterParams, WarningDaysParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/cycles?group_id=
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<GroupFilterParams>,
) -> AppResult<ApiResponse<Vec<MedicationCycle>>> {
    let cycles =
        MedicationCycleRepo::list_for_user(&state.pool, auth.user_id, params.group_id).await?;
    Ok(ApiResponse::ok(cycles, "Medication cycles retrieved"))
}

/// GET /api/v1/cycles/current
///
/// Active cycles covering today.
pub async fn list_current(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationCycle>>> {
    let cycles =
        MedicationCycleRepo::list_current(&state.pool, auth.user_id, state.clock.today()).await?;
    Ok(ApiResponse::ok(cycles, "Current medication cycles retrieved"))
}

/// GET /api/v1/cycles/expiration?warning_days=7
pub async fn expiration(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WarningDaysParams>,
) -> AppResult<ApiResponse<ExpirationReport>> {
    let warning_days = params
        .warning_days
        .unwrap_or(DEFAULT_EXPIRATION_WARNING_DAYS);
    validate_warning_days(warning_days).map_err(AppError::validation)?;

    let snapshots: Vec<CycleSnapshot> = MedicationCycleRepo::expiration_rows(&state.pool, auth.user_id)
        .await?
        .into_iter()
        .map(CycleSnapshot::from)
        .collect();
    let report = classify_expiration(state.clock.today(), warning_days, &snapshots);

    let message = if report.needs_renewal {
        "Some prescriptions have run out and need renewal"
    } else {
        "Cycle expiration checked"
    };
    Ok(ApiResponse::ok(report, message))
}

/// POST /api/v1/cycles
///
/// `cycle_number` defaults to the group's next number.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMedicationCycle>,
) -> AppResult<ApiResponse<MedicationCycle>> {
    validate_cycle_bounds(input.cycle_start, input.cycle_end).map_err(AppError::validation)?;
    if input.cycle_number.is_some_and(|n| n < 1) {
        return Err(AppError::validation("cycle_number must be at least 1"));
    }
    let owner = MedicationGroupRepo::owner_id(&state.pool, input.group_id).await?;
    ensure_owner(owner, auth.user_id, "MedicationGroup", input.group_id)?;

    let cycle = MedicationCycleRepo::create(&state.pool, &input).await?;
    Ok(ApiResponse::created(cycle, "Medication cycle created"))
}

/// GET /api/v1/cycles/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<MedicationCycle>> {
    let cycle = MedicationCycleRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicationCycle", id))?;
    Ok(ApiResponse::ok(cycle, "Medication cycle retrieved"))
}

/// PUT /api/v1/cycles/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMedicationCycle>,
) -> AppResult<ApiResponse<MedicationCycle>> {
    let current = MedicationCycleRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicationCycle", id))?;
    validate_cycle_bounds(
        input.cycle_start.unwrap_or(current.cycle_start),
        input.cycle_end.or(current.cycle_end),
    )
    .map_err(AppError::validation)?;

    let cycle = MedicationCycleRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("MedicationCycle", id))?;
    Ok(ApiResponse::ok(cycle, "Medication cycle updated"))
}

/// DELETE /api/v1/cycles/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        MedicationCycleRepo::delete(&state.pool, id, auth.user_id).await?,
        "MedicationCycle",
        id,
    )
}
