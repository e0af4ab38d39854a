//! Handlers for the `/records` resource (intake records).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::analytics::{
    record_window_stats, Period, RecordFact, RecordWindowStats, DEFAULT_COMPLIANCE_DAYS,
};
use bokyak_core::records::{
    validate_effectiveness_score, validate_quantity_taken, RecordType,
};
use bokyak_core::types::DbId;
use bokyak_db::models::medication_record::{
    CreateMedicationRecord, MedicationRecord, RecordFilter, UpdateMedicationRecord,
};
use bokyak_db::repositories::{MedicationDetailRepo, MedicationRecordRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::dosage::{check_in_for, CheckInRequest};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::query::{non_blank, parse_optional_date, DaysParams, RecordListParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Default window of the record listing, in days before today.
const DEFAULT_LIST_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub records: Vec<MedicationRecord>,
    pub date_range: Period,
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct BulkCheckInRequest {
    pub records: Vec<CheckInRequest>,
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub medication_detail_id: DbId,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BulkCheckInResult {
    pub created_records: Vec<MedicationRecord>,
    pub failed_records: Vec<BulkFailure>,
    pub total_requested: usize,
    pub total_created: usize,
    pub total_failed: usize,
}

fn validate_record_fields(
    record_type: Option<&str>,
    quantity_taken: Option<f64>,
    effectiveness_score: Option<i16>,
) -> AppResult<()> {
    if let Some(record_type) = record_type {
        RecordType::from_str_value(record_type).map_err(AppError::validation)?;
    }
    if let Some(quantity) = quantity_taken {
        validate_quantity_taken(quantity).map_err(AppError::validation)?;
    }
    validate_effectiveness_score(effectiveness_score).map_err(AppError::validation)?;
    Ok(())
}

/// GET /api/v1/records?start_date=&end_date=&group_id=&record_type=&medication_detail_id=
///
/// Defaults to the last seven days through today.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RecordListParams>,
) -> AppResult<ApiResponse<RecordList>> {
    let (default_start, default_end) = state.clock.trailing_days(DEFAULT_LIST_DAYS);
    let start = parse_optional_date(params.start_date.as_deref())?.unwrap_or(default_start);
    let end = parse_optional_date(params.end_date.as_deref())?.unwrap_or(default_end);
    if start > end {
        return Err(AppError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let record_type = non_blank(params.record_type.as_deref())
        .map(RecordType::from_str_value)
        .transpose()
        .map_err(AppError::validation)?;

    let (from, to) = state.clock.range_bounds(start, end);
    let filter = RecordFilter {
        from,
        to,
        group_id: params.group_id,
        record_type: record_type.map(|t| t.as_str().to_string()),
        medication_detail_id: params.medication_detail_id,
    };
    let records = MedicationRecordRepo::list_filtered(&state.pool, auth.user_id, &filter).await?;

    Ok(ApiResponse::ok(
        RecordList {
            total_count: records.len(),
            records,
            date_range: Period {
                start_date: start,
                end_date: end,
            },
        },
        "Medication records retrieved",
    ))
}

/// GET /api/v1/records/today
pub async fn list_today(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationRecord>>> {
    let (from, to) = state.clock.day_bounds(state.clock.today());
    let filter = RecordFilter {
        from,
        to,
        group_id: None,
        record_type: None,
        medication_detail_id: None,
    };
    let records = MedicationRecordRepo::list_filtered(&state.pool, auth.user_id, &filter).await?;
    Ok(ApiResponse::ok(records, "Today's medication records retrieved"))
}

/// GET /api/v1/records/statistics?days=7
pub async fn statistics(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> AppResult<ApiResponse<RecordWindowStats>> {
    let days = params.resolve(DEFAULT_COMPLIANCE_DAYS)?;
    let (start, end) = state.clock.trailing_days(days);
    let (from, to) = state.clock.range_bounds(start, end);
    let facts: Vec<RecordFact> =
        MedicationRecordRepo::facts_for_user(&state.pool, auth.user_id, from, to, None)
            .await?
            .into_iter()
            .map(RecordFact::from)
            .collect();
    Ok(ApiResponse::ok(
        record_window_stats(days, &facts),
        "Record statistics retrieved",
    ))
}

/// POST /api/v1/records
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMedicationRecord>,
) -> AppResult<ApiResponse<MedicationRecord>> {
    validate_record_fields(
        input.record_type.as_deref(),
        input.quantity_taken,
        input.effectiveness_score,
    )?;
    let owner = MedicationDetailRepo::owner_id(&state.pool, input.medication_detail_id).await?;
    ensure_owner(
        owner,
        auth.user_id,
        "MedicationDetail",
        input.medication_detail_id,
    )?;

    let record = MedicationRecordRepo::create(&state.pool, &input).await?;
    Ok(ApiResponse::created(record, "Medication record created"))
}

/// POST /api/v1/records/bulk
///
/// Runs the daily check-in per item. A failing item is reported and the
/// rest of the batch continues.
pub async fn bulk(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkCheckInRequest>,
) -> AppResult<ApiResponse<BulkCheckInResult>> {
    if input.records.is_empty() {
        return Err(AppError::BadRequest("records must not be empty".to_string()));
    }

    let total_requested = input.records.len();
    let mut created_records = Vec::new();
    let mut failed_records = Vec::new();

    for item in &input.records {
        match check_in_for(&state.pool, &state.clock, auth.user_id, item).await {
            Ok(outcome) => created_records.push(outcome.record),
            Err(err) => {
                let (_, _, message) = err.classify();
                tracing::warn!(
                    user_id = auth.user_id,
                    medication_detail_id = item.medication_detail_id,
                    error = %message,
                    "Bulk check-in item failed",
                );
                failed_records.push(BulkFailure {
                    medication_detail_id: item.medication_detail_id,
                    error: message,
                });
            }
        }
    }

    let result = BulkCheckInResult {
        total_requested,
        total_created: created_records.len(),
        total_failed: failed_records.len(),
        created_records,
        failed_records,
    };
    Ok(ApiResponse::created(result, "Bulk check-in processed"))
}

/// GET /api/v1/records/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<MedicationRecord>> {
    let record = MedicationRecordRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicationRecord", id))?;
    Ok(ApiResponse::ok(record, "Medication record retrieved"))
}

/// PUT /api/v1/records/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMedicationRecord>,
) -> AppResult<ApiResponse<MedicationRecord>> {
    validate_record_fields(
        input.record_type.as_deref(),
        input.quantity_taken,
        input.effectiveness_score,
    )?;
    let record = MedicationRecordRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("MedicationRecord", id))?;
    Ok(ApiResponse::ok(record, "Medication record updated"))
}

/// DELETE /api/v1/records/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        MedicationRecordRepo::delete(&state.pool, id, auth.user_id).await?,
        "MedicationRecord",
        id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_records_are_accepted_outside_check_in() {
        assert!(validate_record_fields(Some("NOTE"), None, None).is_ok());
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        assert!(validate_record_fields(None, None, Some(11)).is_err());
        assert!(validate_record_fields(None, Some(-0.5), None).is_err());
        assert!(validate_record_fields(Some("taken"), None, None).is_err());
    }
}
