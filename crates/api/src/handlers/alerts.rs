//! Handlers for the `/alerts` resource (reminder alerts).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bokyak_core::alerts::{AlertType, UPCOMING_WINDOW_MINS};
use bokyak_core::types::DbId;
use bokyak_db::models::medication_alert::{
    CreateMedicationAlert, MedicationAlert, UpdateMedicationAlert,
};
use bokyak_db::repositories::{MedicationAlertRepo, MedicationDetailRepo};
use chrono::{Duration, NaiveTime};

use crate::error::{AppError, AppResult};
use crate::handlers::{deleted, ensure_owner};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// The `[from, to]` window of upcoming alerts starting at `now`. `to` wraps
/// past midnight.
fn upcoming_window(now: NaiveTime) -> (NaiveTime, NaiveTime) {
    let (to, _) = now.overflowing_add_signed(Duration::minutes(UPCOMING_WINDOW_MINS));
    (now, to)
}

/// GET /api/v1/alerts
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationAlert>>> {
    let alerts = MedicationAlertRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(alerts, "Medication alerts retrieved"))
}

/// GET /api/v1/alerts/active
pub async fn list_active(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationAlert>>> {
    let alerts = MedicationAlertRepo::list_active(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::ok(alerts, "Active medication alerts retrieved"))
}

/// GET /api/v1/alerts/upcoming
///
/// Active alerts due within the next hour of local time.
pub async fn list_upcoming(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MedicationAlert>>> {
    let (from, to) = upcoming_window(state.clock.now().time());
    let alerts = MedicationAlertRepo::list_upcoming(&state.pool, auth.user_id, from, to).await?;
    Ok(ApiResponse::ok(alerts, "Upcoming medication alerts retrieved"))
}

/// POST /api/v1/alerts
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMedicationAlert>,
) -> AppResult<ApiResponse<MedicationAlert>> {
    AlertType::from_str_value(&input.alert_type).map_err(AppError::validation)?;
    let owner = MedicationDetailRepo::owner_id(&state.pool, input.medication_detail_id).await?;
    ensure_owner(
        owner,
        auth.user_id,
        "MedicationDetail",
        input.medication_detail_id,
    )?;

    let alert = MedicationAlertRepo::create(&state.pool, &input).await?;
    Ok(ApiResponse::created(alert, "Medication alert created"))
}

/// GET /api/v1/alerts/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<MedicationAlert>> {
    let alert = MedicationAlertRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::not_found("MedicationAlert", id))?;
    Ok(ApiResponse::ok(alert, "Medication alert retrieved"))
}

/// PUT /api/v1/alerts/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMedicationAlert>,
) -> AppResult<ApiResponse<MedicationAlert>> {
    if let Some(alert_type) = input.alert_type.as_deref() {
        AlertType::from_str_value(alert_type).map_err(AppError::validation)?;
    }
    let alert = MedicationAlertRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("MedicationAlert", id))?;
    Ok(ApiResponse::ok(alert, "Medication alert updated"))
}

/// DELETE /api/v1/alerts/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    deleted(
        MedicationAlertRepo::delete(&state.pool, id, auth.user_id).await?,
        "MedicationAlert",
        id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn window_spans_one_hour() {
        assert_eq!(upcoming_window(t(8, 15)), (t(8, 15), t(9, 15)));
    }

    #[test]
    fn window_wraps_past_midnight() {
        assert_eq!(upcoming_window(t(23, 30)), (t(23, 30), t(0, 30)));
    }
}
