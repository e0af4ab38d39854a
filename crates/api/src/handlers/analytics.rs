//! Handlers for `/analytics`: adherence statistics over the caller's
//! records and stock projections over their active details.
//!
//! Every window is anchored at the local "today" of [`AppState::clock`].

use axum::extract::{Query, State};
use bokyak_core::analytics::{
    adherence_report, compliance, days_remaining, record_statistics, side_effects, timing,
    weekly_trends, AdherencePeriod, AdherenceReport, ComplianceSummary, RecordFact,
    RecordStatistics, SideEffectSummary, TimingAnalysis, TrendReport, DEFAULT_COMPLIANCE_DAYS,
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_SIDE_EFFECT_DAYS, DEFAULT_STATISTICS_DAYS,
    DEFAULT_TIMING_DAYS, DEFAULT_TREND_DAYS, PERIOD_MONTH,
};
use bokyak_core::dosage::daily_usage;
use bokyak_core::types::DbId;
use bokyak_db::repositories::{MedicationDetailRepo, MedicationRecordRepo};
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{non_blank, AdherenceParams, DaysParams, ThresholdParams};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LowStockEntry {
    pub medication_detail_id: DbId,
    pub medication_name: String,
    pub remaining_quantity: f64,
    pub days_remaining: f64,
    pub hospital_name: String,
    pub group_name: String,
}

#[derive(Debug, Serialize)]
pub struct LowStockReport {
    pub entries: Vec<LowStockEntry>,
    pub low_stock_count: usize,
    pub threshold: f64,
}

/// The caller's records dated within local days `start..=end`.
pub(crate) async fn load_facts(
    state: &AppState,
    user_id: DbId,
    start: NaiveDate,
    end: NaiveDate,
    group_id: Option<DbId>,
) -> AppResult<Vec<RecordFact>> {
    let (from, to) = state.clock.range_bounds(start, end);
    let rows =
        MedicationRecordRepo::facts_for_user(&state.pool, user_id, from, to, group_id).await?;
    Ok(rows.into_iter().map(RecordFact::from).collect())
}

/// GET /api/v1/analytics/statistics?days=30
pub async fn statistics(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> AppResult<ApiResponse<RecordStatistics>> {
    let days = params.resolve(DEFAULT_STATISTICS_DAYS)?;
    let (start, end) = state.clock.trailing_days(days);
    let facts = load_facts(&state, auth.user_id, start, end, None).await?;
    Ok(ApiResponse::ok(
        record_statistics(start, end, &facts),
        "Medication statistics retrieved",
    ))
}

/// GET /api/v1/analytics/compliance?days=7
pub async fn compliance_rate(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> AppResult<ApiResponse<ComplianceSummary>> {
    let days = params.resolve(DEFAULT_COMPLIANCE_DAYS)?;
    let (start, end) = state.clock.trailing_days(days);
    let facts = load_facts(&state, auth.user_id, start, end, None).await?;
    Ok(ApiResponse::ok(
        compliance(days, &facts),
        "Compliance rate retrieved",
    ))
}

/// GET /api/v1/analytics/low-stock?threshold=5
pub async fn low_stock(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ThresholdParams>,
) -> AppResult<ApiResponse<LowStockReport>> {
    let threshold = params.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(AppError::validation("threshold must not be negative"));
    }

    let details = MedicationDetailRepo::list_low_stock(&state.pool, auth.user_id, threshold).await?;
    let entries: Vec<LowStockEntry> = details
        .into_iter()
        .map(|detail| LowStockEntry {
            days_remaining: days_remaining(
                detail.remaining_quantity,
                daily_usage(detail.dosage_pattern()),
            ),
            medication_detail_id: detail.id,
            medication_name: detail.medication_name,
            remaining_quantity: detail.remaining_quantity,
            hospital_name: detail.hospital_name,
            group_name: detail.group_name,
        })
        .collect();

    let report = LowStockReport {
        low_stock_count: entries.len(),
        entries,
        threshold,
    };
    Ok(ApiResponse::ok(report, "Low stock medications retrieved"))
}

/// GET /api/v1/analytics/side-effects?days=30
pub async fn side_effect_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> AppResult<ApiResponse<SideEffectSummary>> {
    let days = params.resolve(DEFAULT_SIDE_EFFECT_DAYS)?;
    let (start, end) = state.clock.trailing_days(days);
    let facts = load_facts(&state, auth.user_id, start, end, None).await?;
    Ok(ApiResponse::ok(
        side_effects(days, &facts),
        "Side effect summary retrieved",
    ))
}

/// GET /api/v1/analytics/timing?days=30
pub async fn timing_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> AppResult<ApiResponse<TimingAnalysis>> {
    let days = params.resolve(DEFAULT_TIMING_DAYS)?;
    let (start, end) = state.clock.trailing_days(days);
    let facts = load_facts(&state, auth.user_id, start, end, None).await?;
    Ok(ApiResponse::ok(
        timing(days, &facts, &state.clock),
        "Timing analysis retrieved",
    ))
}

/// GET /api/v1/analytics/adherence?period=week|month|quarter&group_id=
pub async fn adherence(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AdherenceParams>,
) -> AppResult<ApiResponse<AdherenceReport>> {
    let period = AdherencePeriod::from_str_value(
        non_blank(params.period.as_deref()).unwrap_or(PERIOD_MONTH),
    )
    .map_err(AppError::validation)?;
    let (start, end) = state.clock.trailing_days(period.days());
    let facts = load_facts(&state, auth.user_id, start, end, params.group_id).await?;
    Ok(ApiResponse::ok(
        adherence_report(period, start, end, &facts, &state.clock),
        "Adherence report retrieved",
    ))
}

/// GET /api/v1/analytics/trends
pub async fn trends(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TrendReport>> {
    let (start, end) = state.clock.trailing_days(DEFAULT_TREND_DAYS);
    let facts = load_facts(&state, auth.user_id, start, end, None).await?;
    Ok(ApiResponse::ok(
        weekly_trends(start, end, &facts, &state.clock),
        "Weekly trends retrieved",
    ))
}
