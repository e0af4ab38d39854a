//! Primitive type aliases shared across crates.

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Medications are keyed by the public drug registry's item sequence number.
pub type ItemSeq = i64;

/// All stored timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (prescription dates, cycle bounds) carry no timezone.
pub type Date = chrono::NaiveDate;
