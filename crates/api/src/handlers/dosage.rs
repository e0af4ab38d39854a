//! Handlers for `/dosage`: the daily schedule, the next dose and the daily
//! check-in.

use axum::extract::{Query, State};
use axum::Json;
use bokyak_core::local_time::LocalClock;
use bokyak_core::records::{parse_check_in_type, validate_quantity_taken};
use bokyak_core::schedule::{
    build_daily_schedule, next_dosage, next_slot_on, DailySchedule, NextDosage,
};
use bokyak_core::types::DbId;
use bokyak_db::models::medication_detail::group_schedule_rows;
use bokyak_db::models::medication_record::{CheckIn, CheckInOutcome, MedicationRecord};
use bokyak_db::repositories::{MedicationDetailRepo, MedicationRecordRepo};
use bokyak_db::DbPool;
use chrono::{NaiveDate, Timelike, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_owner;
use crate::middleware::auth::AuthUser;
use crate::query::{parse_optional_date, ScheduleParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// One check-in for today. `quantity_taken` defaults to 0.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    pub medication_detail_id: DbId,
    pub record_type: String,
    pub quantity_taken: Option<f64>,
    pub notes: Option<String>,
}

/// Validate and apply one check-in for the caller's local today.
///
/// Shared by the single check-in and the bulk record endpoint.
pub(crate) async fn check_in_for(
    pool: &DbPool,
    clock: &LocalClock,
    user_id: DbId,
    request: &CheckInRequest,
) -> AppResult<CheckInOutcome> {
    let record_type = parse_check_in_type(&request.record_type).map_err(AppError::validation)?;
    let quantity_taken = request.quantity_taken.unwrap_or(0.0);
    validate_quantity_taken(quantity_taken).map_err(AppError::validation)?;

    let owner = MedicationDetailRepo::owner_id(pool, request.medication_detail_id).await?;
    ensure_owner(
        owner,
        user_id,
        "MedicationDetail",
        request.medication_detail_id,
    )?;

    let (day_start, day_end) = clock.day_bounds(clock.today());
    let input = CheckIn {
        medication_detail_id: request.medication_detail_id,
        record_type: record_type.as_str().to_string(),
        quantity_taken,
        notes: request.notes.clone().unwrap_or_default(),
    };
    let outcome =
        MedicationRecordRepo::check_in(pool, &input, day_start, day_end, Utc::now()).await?;

    tracing::debug!(
        user_id,
        medication_detail_id = input.medication_detail_id,
        record_type = %input.record_type,
        created = outcome.created,
        "Check-in recorded",
    );
    Ok(outcome)
}

/// Build the caller's schedule for one local date.
async fn schedule_for(
    state: &AppState,
    user_id: DbId,
    date: NaiveDate,
    group_id: Option<DbId>,
) -> AppResult<DailySchedule> {
    let (day_start, day_end) = state.clock.day_bounds(date);
    let rows = MedicationDetailRepo::schedule_rows(
        &state.pool,
        user_id,
        date,
        day_start,
        day_end,
        group_id,
    )
    .await?;
    let groups = group_schedule_rows(rows);
    Ok(build_daily_schedule(user_id, date, &groups))
}

/// GET /api/v1/dosage/today?date=&group_id=
pub async fn today(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> AppResult<ApiResponse<DailySchedule>> {
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or_else(|| state.clock.today());
    let schedule = schedule_for(&state, auth.user_id, date, params.group_id).await?;
    Ok(ApiResponse::ok(schedule, "Daily medication schedule retrieved"))
}

/// GET /api/v1/dosage/next
pub async fn next(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<NextDosage>> {
    let now = state.clock.now();
    let (slot, target_date) = next_slot_on(now.date_naive(), now.hour());
    let schedule = schedule_for(&state, auth.user_id, target_date, None).await?;
    Ok(ApiResponse::ok(
        next_dosage(&schedule, slot),
        "Next dosage retrieved",
    ))
}

/// POST /api/v1/dosage/check
///
/// 201 when today's record was created, 200 when it was overwritten.
pub async fn check(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CheckInRequest>,
) -> AppResult<ApiResponse<MedicationRecord>> {
    let outcome = check_in_for(&state.pool, &state.clock, auth.user_id, &input).await?;
    Ok(if outcome.created {
        ApiResponse::created(outcome.record, "Medication check recorded")
    } else {
        ApiResponse::ok(outcome.record, "Medication check updated")
    })
}
