//! Handlers for the `/groups` resource (medication groups).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::renewal::validate_group_name;
use bokyak_core::types::DbId;
use bokyak_db::models::medication_cycle::MedicationCycle;
use bokyak_db::models::medication_detail::MedicationDetailView;
use bokyak_db::models::medication_group::{
    CreateMedicationGroup, MedicationGroup, UpdateMedicationGroup,
};
use bokyak_db::repositories::{
    MedicalInfoRepo, MedicationCycleRepo, MedicationDetailRepo, MedicationGroupRepo,
    PrescriptionRepo,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// A group with its active cycles and their details.
#[derive(Debug, Serialize)]
pub struct GroupWithCycles {
    #[serde(flatten)]
    pub group: MedicationGroup,
    pub active_cycles: Vec<CycleWithDetails>,
}

#[derive(Debug, Serialize)]
pub struct CycleWithDetails {
    #[serde(flatten)]
    pub cycle: MedicationCycle,
    pub details: Vec<MedicationDetailView>,
}

async fn ensure_prescription(
    state: &AppState,
    user_id: DbId,
    prescription_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(prescription_id) = prescription_id {
        let owner = PrescriptionRepo::owner_id(&state.pool, prescription_id).await?;
        ensure_owner(owner, user_id, "Prescription", prescription_id)?;
    }
    Ok(())
}

/// GET /api/v1/groups
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationGroup>>> {
    let groups = MedicationGroupRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(groups, "Medication groups retrieved"))
}

/// GET /api/v1/groups/active
///
/// Groups with at least one active cycle.
pub async fn list_active(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationGroup>>> {
    let groups = MedicationGroupRepo::list_active(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(groups, "Active medication groups retrieved"))
}

/// POST /api/v1/groups
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMedicationGroup>,
) -> AppResult<ApiResponse<MedicationGroup>> {
    validate_group_name(&input.group_name).map_err(AppError::validation)?;
    let owner = MedicalInfoRepo::owner_id(&state.pool, input.medical_info_id).await?;
    ensure_owner(owner, auth.user_id, "MedicalInfo", input.medical_info_id)?;
    ensure_prescription(&state, auth.user_id, input.prescription_id).await?;

    let group = MedicationGroupRepo::create(&state.pool, &input).await?;
    Ok(ApiResponse::created(group, "Medication group created"))
}

/// GET /api/v1/groups/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<GroupWithCycles>> {
    let group = MedicationGroupRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicationGroup", id))?;

    let cycles = MedicationCycleRepo::list_active_for_group(&state.pool, group.id).await?;
    let cycle_ids: Vec<DbId> = cycles.iter().map(|c| c.id).collect();
    let details = MedicationDetailRepo::list_for_cycles(&state.pool, &cycle_ids).await?;

    let active_cycles = cycles
        .into_iter()
        .map(|cycle| CycleWithDetails {
            details: details
                .iter()
                .filter(|d| d.cycle_id == cycle.id)
                .cloned()
                .collect(),
            cycle,
        })
        .collect();

    Ok(ApiResponse::ok(
        GroupWithCycles {
            group,
            active_cycles,
        },
        "Medication group retrieved",
    ))
}

/// PUT /api/v1/groups/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMedicationGroup>,
) -> AppResult<ApiResponse<MedicationGroup>> {
    if let Some(name) = &input.group_name {
        validate_group_name(name).map_err(AppError::validation)?;
    }
    ensure_prescription(&state, auth.user_id, input.prescription_id).await?;

    let group = MedicationGroupRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("MedicationGroup", id))?;
    Ok(ApiResponse::ok(group, "Medication group updated"))
}

/// DELETE /api/v1/groups/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        MedicationGroupRepo::delete(&state.pool, id, auth.user_id).await?,
        "MedicationGroup",
        id,
    )
}
