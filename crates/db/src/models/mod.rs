//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Joined read models used by schedules and analytics live next to the
//! entity they are centred on.

pub mod api_key;
pub mod hospital;
pub mod illness;
pub mod ingredient;
pub mod medical_info;
pub mod medication;
pub mod medication_alert;
pub mod medication_cycle;
pub mod medication_detail;
pub mod medication_group;
pub mod medication_record;
pub mod prescription;
pub mod prescription_medication;
pub mod renewal;
pub mod session;
pub mod user;
