//! Adherence analytics over intake records.
//!
//! Callers load the records of a date window (already scoped to one user)
//! and hand them in as [`RecordFact`]s; every function here is pure
//! arithmetic over those facts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::dosage::SLOT_WINDOWS;
use crate::local_time::LocalClock;
use crate::records::{RECORD_MISSED, RECORD_SIDE_EFFECT, RECORD_SKIPPED, RECORD_TAKEN};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_STATISTICS_DAYS: i64 = 30;
pub const DEFAULT_COMPLIANCE_DAYS: i64 = 7;
pub const DEFAULT_SIDE_EFFECT_DAYS: i64 = 30;
pub const DEFAULT_TIMING_DAYS: i64 = 30;
pub const DEFAULT_TREND_DAYS: i64 = 30;

/// Remaining quantity at or below which a detail counts as low on stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 5.0;

/// Upper bound for any `days` query parameter.
pub const MAX_WINDOW_DAYS: i64 = 366;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The fields of a record that analytics needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFact {
    pub record_type: String,
    pub record_date: Timestamp,
    pub medication_name: String,
}

impl RecordFact {
    fn is(&self, record_type: &str) -> bool {
        self.record_type == record_type
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / total * 100`, or 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// `part / total` as a 0..1 ratio rounded to 2 places.
pub fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(part as f64 / total as f64, 2)
    }
}

/// Validate a `days` window parameter.
pub fn validate_window_days(days: i64) -> Result<(), String> {
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
        ));
    }
    Ok(())
}

fn count_type(facts: &[RecordFact], record_type: &str) -> usize {
    facts.iter().filter(|f| f.is(record_type)).count()
}

// ---------------------------------------------------------------------------
// Statistics / compliance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordStatistics {
    pub period: Period,
    pub total_records: usize,
    pub taken_records: usize,
    pub missed_records: usize,
    pub skipped_records: usize,
    pub side_effect_records: usize,
    pub adherence_rate: f64,
}

/// Per-type counts and the taken percentage over a window.
pub fn record_statistics(start: NaiveDate, end: NaiveDate, facts: &[RecordFact]) -> RecordStatistics {
    let taken = count_type(facts, RECORD_TAKEN);
    RecordStatistics {
        period: Period {
            start_date: start,
            end_date: end,
        },
        total_records: facts.len(),
        taken_records: taken,
        missed_records: count_type(facts, RECORD_MISSED),
        skipped_records: count_type(facts, RECORD_SKIPPED),
        side_effect_records: count_type(facts, RECORD_SIDE_EFFECT),
        adherence_rate: round_to(percentage(taken, facts.len()), 2),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub total_records: usize,
    pub taken_records: usize,
    pub compliance_rate: f64,
    pub period_days: i64,
}

pub fn compliance(days: i64, facts: &[RecordFact]) -> ComplianceSummary {
    let taken = count_type(facts, RECORD_TAKEN);
    ComplianceSummary {
        total_records: facts.len(),
        taken_records: taken,
        compliance_rate: round_to(percentage(taken, facts.len()), 2),
        period_days: days,
    }
}

/// Short summary served by the record listing's statistics action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordWindowStats {
    pub period_days: i64,
    pub total_records: usize,
    pub taken: usize,
    pub missed: usize,
    pub compliance_rate: f64,
}

pub fn record_window_stats(days: i64, facts: &[RecordFact]) -> RecordWindowStats {
    let taken = count_type(facts, RECORD_TAKEN);
    RecordWindowStats {
        period_days: days,
        total_records: facts.len(),
        taken,
        missed: count_type(facts, RECORD_MISSED),
        compliance_rate: round_to(percentage(taken, facts.len()), 2),
    }
}

// ---------------------------------------------------------------------------
// Side effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideEffectCount {
    pub medication_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideEffectSummary {
    pub period_days: i64,
    pub total_side_effects: usize,
    pub side_effects_by_medication: Vec<SideEffectCount>,
}

/// Count SIDE_EFFECT records per medication, most frequent first.
pub fn side_effects(days: i64, facts: &[RecordFact]) -> SideEffectSummary {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for fact in facts.iter().filter(|f| f.is(RECORD_SIDE_EFFECT)) {
        *counts.entry(fact.medication_name.as_str()).or_default() += 1;
    }

    let mut by_medication: Vec<SideEffectCount> = counts
        .into_iter()
        .map(|(name, count)| SideEffectCount {
            medication_name: name.to_string(),
            count,
        })
        .collect();
    // BTreeMap iteration is name-ordered, so a stable sort keeps names
    // ascending within equal counts.
    by_medication.sort_by(|a, b| b.count.cmp(&a.count));

    SideEffectSummary {
        period_days: days,
        total_side_effects: by_medication.iter().map(|s| s.count).sum(),
        side_effects_by_medication: by_medication,
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimingBucket {
    pub count: usize,
    pub on_time: usize,
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingAnalysis {
    pub period_days: i64,
    pub timing_stats: IndexMap<String, TimingBucket>,
}

/// Bucket the local hour of each TAKEN record by slot window.
pub fn timing(days: i64, facts: &[RecordFact], clock: &LocalClock) -> TimingAnalysis {
    let mut stats: IndexMap<String, TimingBucket> = SLOT_WINDOWS
        .iter()
        .map(|w| (w.slot.to_string(), TimingBucket::default()))
        .collect();

    for fact in facts.iter().filter(|f| f.is(RECORD_TAKEN)) {
        let hour = clock.local_hour(fact.record_date);
        for window in SLOT_WINDOWS {
            if window.contains(hour) {
                if let Some(bucket) = stats.get_mut(window.slot) {
                    bucket.count += 1;
                    if window.is_on_time(hour) {
                        bucket.on_time += 1;
                    }
                }
            }
        }
    }

    for bucket in stats.values_mut() {
        bucket.on_time_rate = round_to(percentage(bucket.on_time, bucket.count), 2);
    }

    TimingAnalysis {
        period_days: days,
        timing_stats: stats,
    }
}

// ---------------------------------------------------------------------------
// Adherence report
// ---------------------------------------------------------------------------

/// Reporting period for the adherence report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherencePeriod {
    Week,
    Month,
    Quarter,
}

pub const PERIOD_WEEK: &str = "week";
pub const PERIOD_MONTH: &str = "month";
pub const PERIOD_QUARTER: &str = "quarter";

/// All valid period strings.
pub const VALID_PERIODS: &[&str] = &[PERIOD_WEEK, PERIOD_MONTH, PERIOD_QUARTER];

impl AdherencePeriod {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            PERIOD_WEEK => Ok(Self::Week),
            PERIOD_MONTH => Ok(Self::Month),
            PERIOD_QUARTER => Ok(Self::Quarter),
            _ => Err(format!(
                "Invalid period '{s}'. Must be one of: {}",
                VALID_PERIODS.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => PERIOD_WEEK,
            Self::Month => PERIOD_MONTH,
            Self::Quarter => PERIOD_QUARTER,
        }
    }

    /// Window length in days.
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyAdherence {
    pub total: usize,
    pub taken: usize,
    pub missed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MedicationAdherence {
    pub total: usize,
    pub taken: usize,
    pub adherence_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdherenceReport {
    pub period: AdherencePeriod,
    pub date_range: Period,
    pub total_records: usize,
    pub adherence_by_type: BTreeMap<String, usize>,
    pub daily_adherence: BTreeMap<NaiveDate, DailyAdherence>,
    pub medication_adherence: BTreeMap<String, MedicationAdherence>,
}

/// Break a window's records down by type, local day and medication.
pub fn adherence_report(
    period: AdherencePeriod,
    start: NaiveDate,
    end: NaiveDate,
    facts: &[RecordFact],
    clock: &LocalClock,
) -> AdherenceReport {
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut daily: BTreeMap<NaiveDate, DailyAdherence> = BTreeMap::new();
    let mut by_medication: BTreeMap<String, MedicationAdherence> = BTreeMap::new();

    for fact in facts {
        *by_type.entry(fact.record_type.clone()).or_default() += 1;

        let day = daily.entry(clock.local_date(fact.record_date)).or_default();
        day.total += 1;
        match fact.record_type.as_str() {
            RECORD_TAKEN => day.taken += 1,
            RECORD_MISSED => day.missed += 1,
            RECORD_SKIPPED => day.skipped += 1,
            _ => {}
        }

        let med = by_medication
            .entry(fact.medication_name.clone())
            .or_default();
        med.total += 1;
        if fact.is(RECORD_TAKEN) {
            med.taken += 1;
        }
    }

    for med in by_medication.values_mut() {
        med.adherence_rate = ratio(med.taken, med.total);
    }

    AdherenceReport {
        period,
        date_range: Period {
            start_date: start,
            end_date: end,
        },
        total_records: facts.len(),
        adherence_by_type: by_type,
        daily_adherence: daily,
        medication_adherence: by_medication,
    }
}

// ---------------------------------------------------------------------------
// Weekly trends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeeklyTrend {
    pub total: usize,
    pub taken: usize,
    pub missed: usize,
    pub adherence_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub date_range: Period,
    pub weekly_trends: BTreeMap<u32, WeeklyTrend>,
    pub total_records: usize,
}

/// Group records by ISO week of their local date.
pub fn weekly_trends(
    start: NaiveDate,
    end: NaiveDate,
    facts: &[RecordFact],
    clock: &LocalClock,
) -> TrendReport {
    let mut weeks: BTreeMap<u32, WeeklyTrend> = BTreeMap::new();
    for fact in facts {
        let week = weeks.entry(clock.local_iso_week(fact.record_date)).or_default();
        week.total += 1;
        if fact.is(RECORD_TAKEN) {
            week.taken += 1;
        } else if fact.is(RECORD_MISSED) {
            week.missed += 1;
        }
    }
    for week in weeks.values_mut() {
        week.adherence_rate = ratio(week.taken, week.total);
    }

    TrendReport {
        date_range: Period {
            start_date: start,
            end_date: end,
        },
        weekly_trends: weeks,
        total_records: facts.len(),
    }
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

/// Days of stock left at the scheduled daily usage, rounded to 1 place.
/// Zero usage (as-needed only) yields 0.
pub fn days_remaining(remaining: f64, daily_usage: f64) -> f64 {
    if daily_usage > 0.0 {
        round_to(remaining / daily_usage, 1)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fact(record_type: &str, y: i32, m: u32, d: u32, h: u32, name: &str) -> RecordFact {
        RecordFact {
            record_type: record_type.to_string(),
            record_date: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            medication_name: name.to_string(),
        }
    }

    fn utc_clock() -> LocalClock {
        LocalClock::from_offset_hours(0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn statistics_counts_and_rate() {
        let facts = vec![
            fact("TAKEN", 2026, 3, 1, 8, "A"),
            fact("TAKEN", 2026, 3, 1, 20, "A"),
            fact("MISSED", 2026, 3, 2, 8, "A"),
            fact("SIDE_EFFECT", 2026, 3, 2, 9, "B"),
            fact("SKIPPED", 2026, 3, 3, 9, "B"),
            fact("NOTE", 2026, 3, 3, 9, "B"),
        ];
        let stats = record_statistics(day(1), day(30), &facts);
        assert_eq!(stats.total_records, 6);
        assert_eq!(stats.taken_records, 2);
        assert_eq!(stats.missed_records, 1);
        assert_eq!(stats.skipped_records, 1);
        assert_eq!(stats.side_effect_records, 1);
        assert_eq!(stats.adherence_rate, 33.33);
    }

    #[test]
    fn empty_windows_have_zero_rates() {
        assert_eq!(compliance(7, &[]).compliance_rate, 0.0);
        assert_eq!(record_window_stats(7, &[]).compliance_rate, 0.0);
        assert_eq!(record_statistics(day(1), day(2), &[]).adherence_rate, 0.0);
    }

    #[test]
    fn side_effects_sorted_by_count_then_name() {
        let facts = vec![
            fact("SIDE_EFFECT", 2026, 3, 1, 8, "Zolpidem"),
            fact("SIDE_EFFECT", 2026, 3, 1, 8, "Aspirin"),
            fact("SIDE_EFFECT", 2026, 3, 2, 8, "Metformin"),
            fact("SIDE_EFFECT", 2026, 3, 3, 8, "Metformin"),
            fact("TAKEN", 2026, 3, 3, 8, "Aspirin"),
        ];
        let summary = side_effects(30, &facts);
        assert_eq!(summary.total_side_effects, 4);
        let names: Vec<&str> = summary
            .side_effects_by_medication
            .iter()
            .map(|s| s.medication_name.as_str())
            .collect();
        assert_eq!(names, vec!["Metformin", "Aspirin", "Zolpidem"]);
    }

    #[test]
    fn timing_counts_window_and_on_time() {
        let facts = vec![
            fact("TAKEN", 2026, 3, 1, 6, "A"),  // morning edge
            fact("TAKEN", 2026, 3, 1, 8, "A"),  // morning on time
            fact("TAKEN", 2026, 3, 1, 15, "A"), // no window
            fact("TAKEN", 2026, 3, 1, 22, "A"), // bedtime on time
            fact("MISSED", 2026, 3, 1, 8, "A"), // ignored
        ];
        let analysis = timing(30, &facts, &utc_clock());
        let morning = analysis.timing_stats["morning"];
        assert_eq!(morning.count, 2);
        assert_eq!(morning.on_time, 1);
        assert_eq!(morning.on_time_rate, 50.0);
        assert_eq!(analysis.timing_stats["bedtime"].on_time, 1);
        assert_eq!(analysis.timing_stats["lunch"].count, 0);
        assert_eq!(analysis.timing_stats["lunch"].on_time_rate, 0.0);
    }

    #[test]
    fn timing_uses_local_hours() {
        // 23:00 UTC is 08:00 KST.
        let facts = vec![fact("TAKEN", 2026, 3, 1, 23, "A")];
        let kst = LocalClock::from_offset_hours(9).unwrap();
        let analysis = timing(30, &facts, &kst);
        assert_eq!(analysis.timing_stats["morning"].count, 1);
        assert_eq!(analysis.timing_stats["bedtime"].count, 0);
    }

    #[test]
    fn adherence_report_breakdowns() {
        let facts = vec![
            fact("TAKEN", 2026, 3, 1, 8, "A"),
            fact("MISSED", 2026, 3, 1, 20, "A"),
            fact("SKIPPED", 2026, 3, 2, 8, "B"),
            fact("TAKEN", 2026, 3, 2, 8, "A"),
        ];
        let report = adherence_report(AdherencePeriod::Week, day(1), day(7), &facts, &utc_clock());
        assert_eq!(report.total_records, 4);
        assert_eq!(report.adherence_by_type["TAKEN"], 2);
        assert_eq!(report.daily_adherence[&day(1)].missed, 1);
        assert_eq!(report.daily_adherence[&day(2)].skipped, 1);
        assert_eq!(report.medication_adherence["A"].adherence_rate, 0.67);
        assert_eq!(report.medication_adherence["B"].adherence_rate, 0.0);
    }

    #[test]
    fn period_parsing() {
        assert_eq!(AdherencePeriod::from_str_value("quarter").unwrap().days(), 90);
        assert_eq!(AdherencePeriod::Week.as_str(), "week");
        assert!(AdherencePeriod::from_str_value("year").is_err());
    }

    #[test]
    fn weekly_trends_group_by_iso_week() {
        // 2026-03-01 is a Sunday (ISO week 9); 2026-03-02 starts week 10.
        let facts = vec![
            fact("TAKEN", 2026, 3, 1, 8, "A"),
            fact("TAKEN", 2026, 3, 2, 8, "A"),
            fact("MISSED", 2026, 3, 3, 8, "A"),
        ];
        let report = weekly_trends(day(1), day(3), &facts, &utc_clock());
        assert_eq!(report.weekly_trends[&9u32].total, 1);
        assert_eq!(report.weekly_trends[&10u32].total, 2);
        assert_eq!(report.weekly_trends[&10u32].missed, 1);
        assert_eq!(report.weekly_trends[&10u32].adherence_rate, 0.5);
    }

    #[test]
    fn days_remaining_rounding() {
        assert_eq!(days_remaining(5.0, 3.0), 1.7);
        assert_eq!(days_remaining(4.0, 0.0), 0.0);
    }

    #[test]
    fn window_days_bounds() {
        assert!(validate_window_days(1).is_ok());
        assert!(validate_window_days(0).is_err());
        assert!(validate_window_days(MAX_WINDOW_DAYS + 1).is_err());
    }
}
