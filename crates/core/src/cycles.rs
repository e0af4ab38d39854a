//! Medication cycle numbering, bounds and expiration.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::types::DbId;

/// Days ahead of `cycle_end` at which a cycle is reported as expiring.
pub const DEFAULT_EXPIRATION_WARNING_DAYS: i64 = 7;

/// Upper bound for `?warning_days=`.
pub const MAX_EXPIRATION_WARNING_DAYS: i64 = 366;

/// Longest supply a single prescription line may cover.
pub const MAX_DURATION_DAYS: i32 = 365;

/// Number assigned to the next cycle of a group given the current maximum.
pub fn next_cycle_number(current_max: Option<i32>) -> i32 {
    current_max.map_or(1, |n| n + 1)
}

/// Whether a cycle's date range covers `date`. An open end never expires.
pub fn covers(start: NaiveDate, end: Option<NaiveDate>, date: NaiveDate) -> bool {
    start <= date && end.map_or(true, |e| date <= e)
}

/// Validate a prescription line's `duration_days` (1..=365).
pub fn validate_duration_days(days: i32) -> Result<(), String> {
    if !(1..=MAX_DURATION_DAYS).contains(&days) {
        return Err(format!(
            "duration_days must be between 1 and {MAX_DURATION_DAYS}, got {days}"
        ));
    }
    Ok(())
}

/// Validate the expiration look-ahead (0..=366 days).
pub fn validate_warning_days(days: i64) -> Result<(), String> {
    if !(0..=MAX_EXPIRATION_WARNING_DAYS).contains(&days) {
        return Err(format!(
            "warning_days must be between 0 and {MAX_EXPIRATION_WARNING_DAYS}, got {days}"
        ));
    }
    Ok(())
}

/// End date of a cycle that must last as long as its longest medication.
///
/// Returns `Ok(None)` when there are no durations and an error when the end
/// date falls outside the calendar.
pub fn cycle_end_for<I>(start: NaiveDate, duration_days: I) -> Result<Option<NaiveDate>, String>
where
    I: IntoIterator<Item = i32>,
{
    duration_days
        .into_iter()
        .max()
        .map(|d| {
            start
                .checked_add_signed(Duration::days(i64::from(d)))
                .ok_or_else(|| format!("A {d}-day cycle starting {start} ends outside the calendar"))
        })
        .transpose()
}

/// Validate explicit cycle bounds.
pub fn validate_cycle_bounds(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), String> {
    match end {
        Some(e) if e < start => Err(format!(
            "cycle_end ({e}) must not be before cycle_start ({start})"
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Expiration
// ---------------------------------------------------------------------------

/// An active cycle as seen by the expiration check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSnapshot {
    pub cycle_id: DbId,
    pub group_id: DbId,
    pub group_name: String,
    pub cycle_end: Option<NaiveDate>,
    pub hospital_name: String,
    pub prescription_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiringCycle {
    #[serde(flatten)]
    pub cycle: CycleSnapshot,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiredCycle {
    #[serde(flatten)]
    pub cycle: CycleSnapshot,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpirationReport {
    pub expiring_soon: Vec<ExpiringCycle>,
    pub expired: Vec<ExpiredCycle>,
    pub needs_renewal: bool,
}

/// Split active cycles into those ending within `warning_days` of `today`
/// and those already past their end. Open-ended cycles are never reported.
pub fn classify_expiration(
    today: NaiveDate,
    warning_days: i64,
    cycles: &[CycleSnapshot],
) -> ExpirationReport {
    let horizon = Duration::try_days(warning_days)
        .and_then(|d| today.checked_add_signed(d))
        .unwrap_or(NaiveDate::MAX);
    let mut expiring_soon = Vec::new();
    let mut expired = Vec::new();

    for cycle in cycles {
        let Some(end) = cycle.cycle_end else {
            continue;
        };
        if end < today {
            expired.push(ExpiredCycle {
                cycle: cycle.clone(),
                days_overdue: (today - end).num_days(),
            });
        } else if end <= horizon {
            expiring_soon.push(ExpiringCycle {
                cycle: cycle.clone(),
                days_remaining: (end - today).num_days(),
            });
        }
    }

    expiring_soon.sort_by_key(|c| c.days_remaining);
    expired.sort_by_key(|c| std::cmp::Reverse(c.days_overdue));

    ExpirationReport {
        needs_renewal: !expired.is_empty(),
        expiring_soon,
        expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    fn snapshot(id: DbId, end: Option<NaiveDate>) -> CycleSnapshot {
        CycleSnapshot {
            cycle_id: id,
            group_id: 1,
            group_name: "Blood pressure".to_string(),
            cycle_end: end,
            hospital_name: "Seoul Clinic".to_string(),
            prescription_id: Some(3),
        }
    }

    #[test]
    fn cycle_numbers_start_at_one() {
        assert_eq!(next_cycle_number(None), 1);
        assert_eq!(next_cycle_number(Some(3)), 4);
    }

    #[test]
    fn covers_handles_open_end() {
        assert!(covers(d(3, 1), None, d(12, 31)));
        assert!(covers(d(3, 1), Some(d(3, 10)), d(3, 10)));
        assert!(!covers(d(3, 1), Some(d(3, 10)), d(3, 11)));
        assert!(!covers(d(3, 2), None, d(3, 1)));
    }

    #[test]
    fn cycle_end_uses_longest_duration() {
        assert_eq!(cycle_end_for(d(3, 1), [7, 30, 14]), Ok(Some(d(3, 31))));
        assert_eq!(cycle_end_for(d(3, 1), Vec::<i32>::new()), Ok(None));
    }

    #[test]
    fn cycle_end_past_the_calendar_is_an_error() {
        assert!(cycle_end_for(d(3, 1), [i32::MAX]).is_err());
        assert!(cycle_end_for(NaiveDate::MAX, [1]).is_err());
    }

    #[test]
    fn duration_and_warning_bounds() {
        assert!(validate_duration_days(1).is_ok());
        assert!(validate_duration_days(MAX_DURATION_DAYS).is_ok());
        assert!(validate_duration_days(0).is_err());
        assert!(validate_duration_days(i32::MAX).is_err());

        assert!(validate_warning_days(0).is_ok());
        assert!(validate_warning_days(MAX_EXPIRATION_WARNING_DAYS).is_ok());
        assert!(validate_warning_days(-1).is_err());
        assert!(validate_warning_days(100_000_000).is_err());
    }

    #[test]
    fn bounds_validation() {
        assert!(validate_cycle_bounds(d(3, 1), Some(d(3, 1))).is_ok());
        assert!(validate_cycle_bounds(d(3, 2), Some(d(3, 1))).is_err());
        assert!(validate_cycle_bounds(d(3, 2), None).is_ok());
    }

    #[test]
    fn expiration_classification() {
        let today = d(3, 15);
        let cycles = vec![
            snapshot(1, Some(d(3, 15))), // ends today
            snapshot(2, Some(d(3, 22))), // at the horizon
            snapshot(3, Some(d(3, 23))), // beyond the horizon
            snapshot(4, Some(d(3, 10))), // expired
            snapshot(5, None),
        ];
        let report = classify_expiration(today, DEFAULT_EXPIRATION_WARNING_DAYS, &cycles);

        let soon: Vec<DbId> = report.expiring_soon.iter().map(|c| c.cycle.cycle_id).collect();
        assert_eq!(soon, vec![1, 2]);
        assert_eq!(report.expiring_soon[0].days_remaining, 0);
        assert_eq!(report.expiring_soon[1].days_remaining, 7);

        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].days_overdue, 5);
        assert!(report.needs_renewal);
    }

    #[test]
    fn huge_horizon_saturates() {
        let report = classify_expiration(d(3, 15), i64::MAX, &[snapshot(1, Some(d(12, 31)))]);
        assert_eq!(report.expiring_soon.len(), 1);
    }

    #[test]
    fn nothing_expired_means_no_renewal() {
        let report = classify_expiration(d(3, 15), 7, &[snapshot(1, Some(d(3, 20)))]);
        assert!(!report.needs_renewal);
        assert_eq!(report.expiring_soon.len(), 1);
    }
}
