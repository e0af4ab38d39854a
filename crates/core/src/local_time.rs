//! Local calendar arithmetic.
//!
//! Timestamps are stored in UTC, but "today", slot hours and day-level
//! aggregation follow the patient's wall clock. [`LocalClock`] carries the
//! configured fixed UTC offset and converts between the two.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike,
    Utc,
};

use crate::types::Timestamp;

/// Korea Standard Time.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Date format accepted in query parameters and request bodies.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-offset wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl Default for LocalClock {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl LocalClock {
    /// Build a clock for a whole-hour offset in `-23..=23`.
    pub fn from_offset_hours(hours: i32) -> Result<Self, String> {
        FixedOffset::east_opt(hours * 3600)
            .map(|offset| Self { offset })
            .ok_or_else(|| format!("UTC offset must be between -23 and 23 hours, got {hours}"))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current local date-time.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Current local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Local calendar date of a stored timestamp.
    pub fn local_date(&self, ts: Timestamp) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Local hour (0..=23) of a stored timestamp.
    pub fn local_hour(&self, ts: Timestamp) -> u32 {
        ts.with_timezone(&self.offset).hour()
    }

    /// ISO week number of a stored timestamp's local date.
    pub fn local_iso_week(&self, ts: Timestamp) -> u32 {
        self.local_date(ts).iso_week().week()
    }

    /// UTC instant of local midnight at the start of `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> Timestamp {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc = local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// Half-open UTC range `[start, end)` covering the local day `date`.
    pub fn day_bounds(&self, date: NaiveDate) -> (Timestamp, Timestamp) {
        self.range_bounds(date, date)
    }

    /// Half-open UTC range covering local days `start..=end`.
    pub fn range_bounds(&self, start: NaiveDate, end: NaiveDate) -> (Timestamp, Timestamp) {
        (
            self.start_of_day(start),
            self.start_of_day(end) + Duration::days(1),
        )
    }

    /// Local date range of the trailing `days` days ending today (inclusive).
    pub fn trailing_days(&self, days: i64) -> (NaiveDate, NaiveDate) {
        let end = self.today();
        (end - Duration::days(days), end)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{s}'. Expected format YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kst() -> LocalClock {
        LocalClock::from_offset_hours(9).unwrap()
    }

    #[test]
    fn day_bounds_shift_by_offset() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let (start, end) = kst().day_bounds(date);
        assert_eq!(start.to_rfc3339(), "2026-03-14T15:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-03-15T15:00:00+00:00");
    }

    #[test]
    fn utc_clock_bounds_are_midnight() {
        let clock = LocalClock::from_offset_hours(0).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let (start, end) = clock.range_bounds(date, date + Duration::days(6));
        assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-08T00:00:00+00:00");
    }

    #[test]
    fn local_hour_and_date_use_offset() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 23, 30, 0).unwrap();
        assert_eq!(kst().local_hour(ts), 8);
        assert_eq!(
            kst().local_date(ts),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
    }

    #[test]
    fn invalid_offset_rejected() {
        assert!(LocalClock::from_offset_hours(24).is_err());
        assert!(LocalClock::from_offset_hours(-5).is_ok());
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(
            parse_date("2026-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert!(parse_date("2026/02/28").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn default_clock_is_kst() {
        assert_eq!(LocalClock::default().offset().local_minus_utc(), 9 * 3600);
    }
}
