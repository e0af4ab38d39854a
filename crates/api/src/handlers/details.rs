//! Handlers for the `/details` resource (per-cycle medication details).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::analytics::DEFAULT_LOW_STOCK_THRESHOLD;
use bokyak_core::dosage::validate_dosage_pattern;
use bokyak_core::types::DbId;
use bokyak_db::models::medication_detail::{
    CreateMedicationDetail, MedicationDetail, MedicationDetailView, UpdateMedicationDetail,
};
use bokyak_db::models::medication_record::MedicationRecord;
use bokyak_db::repositories::{
    MedicationCycleRepo, MedicationDetailRepo, MedicationRecordRepo, PrescriptionMedicationRepo,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::query::CycleFilterParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// A detail with its intake history.
#[derive(Debug, Serialize)]
pub struct DetailWithRecords {
    #[serde(flatten)]
    pub detail: MedicationDetailView,
    pub records: Vec<MedicationRecord>,
}

fn validate_stock_fields(
    pattern: Option<&serde_json::Value>,
    remaining_quantity: Option<f64>,
) -> AppResult<()> {
    if let Some(pattern) = pattern.filter(|p| !p.is_null()) {
        validate_dosage_pattern(pattern).map_err(AppError::validation)?;
    }
    if remaining_quantity.is_some_and(|q| !q.is_finite() || q < 0.0) {
        return Err(AppError::validation(
            "remaining_quantity must not be negative",
        ));
    }
    Ok(())
}

/// GET /api/v1/details?cycle_id=
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CycleFilterParams>,
) -> AppResult<ApiResponse<Vec<MedicationDetailView>>> {
    let details =
        MedicationDetailRepo::list_for_user(&state.pool, auth.user_id, params.cycle_id).await?;
    Ok(ApiResponse::ok(details, "Medication details retrieved"))
}

/// GET /api/v1/details/today
pub async fn list_today(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationDetailView>>> {
    let details =
        MedicationDetailRepo::list_today(&state.pool, auth.user_id, state.clock.today()).await?;
    Ok(ApiResponse::ok(details, "Today's medication details retrieved"))
}

/// GET /api/v1/details/low-stock
pub async fn list_low_stock(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationDetailView>>> {
    let details = MedicationDetailRepo::list_low_stock(
        &state.pool,
        auth.user_id,
        DEFAULT_LOW_STOCK_THRESHOLD,
    )
    .await?;
    Ok(ApiResponse::ok(details, "Low stock medication details retrieved"))
}

/// POST /api/v1/details
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMedicationDetail>,
) -> AppResult<ApiResponse<MedicationDetail>> {
    validate_stock_fields(input.actual_dosage_pattern.as_ref(), input.remaining_quantity)?;

    let cycle_owner = MedicationCycleRepo::owner_id(&state.pool, input.cycle_id).await?;
    ensure_owner(cycle_owner, auth.user_id, "MedicationCycle", input.cycle_id)?;
    let line_owner =
        PrescriptionMedicationRepo::owner_id(&state.pool, input.prescription_medication_id)
            .await?;
    ensure_owner(
        line_owner,
        auth.user_id,
        "PrescriptionMedication",
        input.prescription_medication_id,
    )?;

    let detail = MedicationDetailRepo::create(&state.pool, &input).await?;
    Ok(ApiResponse::created(detail, "Medication detail created"))
}

/// GET /api/v1/details/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<DetailWithRecords>> {
    let detail = MedicationDetailRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicationDetail", id))?;
    let records = MedicationRecordRepo::list_for_detail(&state.pool, id).await?;
    Ok(ApiResponse::ok(
        DetailWithRecords { detail, records },
        "Medication detail retrieved",
    ))
}

/// PUT /api/v1/details/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMedicationDetail>,
) -> AppResult<ApiResponse<MedicationDetail>> {
    validate_stock_fields(
        input.actual_dosage_pattern.as_ref().and_then(Option::as_ref),
        input.remaining_quantity,
    )?;
    let detail = MedicationDetailRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("MedicationDetail", id))?;
    Ok(ApiResponse::ok(detail, "Medication detail updated"))
}

/// DELETE /api/v1/details/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        MedicationDetailRepo::delete(&state.pool, id, auth.user_id).await?,
        "MedicationDetail",
        id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_pattern_is_accepted() {
        assert!(validate_stock_fields(Some(&serde_json::Value::Null), Some(3.0)).is_ok());
        assert!(validate_stock_fields(None, None).is_ok());
    }

    #[test]
    fn negative_stock_is_rejected() {
        assert!(validate_stock_fields(None, Some(-1.0)).is_err());
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        assert!(validate_stock_fields(Some(&json!("morning")), None).is_err());
    }
}
