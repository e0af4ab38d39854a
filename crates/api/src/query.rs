//! Shared query parameter types for API handlers.
//!
//! Dates arrive as raw strings and are parsed with
//! [`bokyak_core::local_time::parse_date`] so a malformed value produces the
//! standard 400 envelope instead of an extractor rejection.

use bokyak_core::analytics::validate_window_days;
use bokyak_core::local_time::parse_date;
use bokyak_core::types::DbId;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?days=` window for statistics endpoints.
#[derive(Debug, Deserialize)]
pub struct DaysParams {
    pub days: Option<i64>,
}

impl DaysParams {
    /// The validated window, falling back to `default`.
    pub fn resolve(&self, default: i64) -> AppResult<i64> {
        let days = self.days.unwrap_or(default);
        validate_window_days(days).map_err(AppError::validation)?;
        Ok(days)
    }
}

/// `?threshold=` for stock checks.
#[derive(Debug, Deserialize)]
pub struct ThresholdParams {
    pub threshold: Option<f64>,
}

/// `?warning_days=` for the cycle expiration check.
#[derive(Debug, Deserialize)]
pub struct WarningDaysParams {
    pub warning_days: Option<i64>,
}

/// `?period=&group_id=` for the adherence report.
#[derive(Debug, Deserialize)]
pub struct AdherenceParams {
    pub period: Option<String>,
    pub group_id: Option<DbId>,
}

/// `?date=&group_id=` for the daily schedule.
#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
    pub date: Option<String>,
    pub group_id: Option<DbId>,
}

/// Filters for `GET /records`.
#[derive(Debug, Deserialize)]
pub struct RecordListParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub group_id: Option<DbId>,
    pub record_type: Option<String>,
    pub medication_detail_id: Option<DbId>,
}

/// `?search=` for the drug reference listing.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// `?name=` for the ingredient search.
#[derive(Debug, Deserialize)]
pub struct NameSearchParams {
    pub name: Option<String>,
}

/// `?hospital_name=&illness_name=` for the medical info search.
#[derive(Debug, Deserialize)]
pub struct MedicalInfoSearchParams {
    pub hospital_name: Option<String>,
    pub illness_name: Option<String>,
}

/// `?group_id=` filter.
#[derive(Debug, Deserialize)]
pub struct GroupFilterParams {
    pub group_id: Option<DbId>,
}

/// `?cycle_id=` filter.
#[derive(Debug, Deserialize)]
pub struct CycleFilterParams {
    pub cycle_id: Option<DbId>,
}

/// `?prescription_id=` filter.
#[derive(Debug, Deserialize)]
pub struct PrescriptionFilterParams {
    pub prescription_id: Option<DbId>,
}

/// Parse an optional `YYYY-MM-DD` parameter.
pub fn parse_optional_date(value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_date(s).map_err(AppError::BadRequest))
        .transpose()
}

/// Treat blank search terms as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
