//! Domain logic for the medication-adherence backend.
//!
//! Everything in this crate is pure computation over data handed in by the
//! caller: dosage-pattern parsing, daily schedule assembly, adherence
//! arithmetic, cycle expiration and identifier generation. The `core` crate
//! contains no database dependencies.

pub mod alerts;
pub mod analytics;
pub mod api_keys;
pub mod codes;
pub mod cycles;
pub mod dosage;
pub mod error;
pub mod illness;
pub mod ingredients;
pub mod local_time;
pub mod records;
pub mod renewal;
pub mod roles;
pub mod schedule;
pub mod types;
