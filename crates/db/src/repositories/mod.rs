//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods whose name ends in
//! `_with` take a `&mut PgConnection` instead so they can be composed inside
//! a caller's transaction.
//!
//! Lookups of user-owned rows take the caller's `user_id` and return `None`
//! for rows owned by someone else.

pub mod api_key_repo;
pub mod hospital_repo;
pub mod illness_repo;
pub mod ingredient_repo;
pub mod medical_info_repo;
pub mod medication_alert_repo;
pub mod medication_cycle_repo;
pub mod medication_detail_repo;
pub mod medication_group_repo;
pub mod medication_record_repo;
pub mod medication_repo;
pub mod prescription_medication_repo;
pub mod prescription_repo;
pub mod renewal_repo;
pub mod session_repo;
pub mod user_repo;

pub use api_key_repo::ApiKeyRepo;
pub use hospital_repo::HospitalRepo;
pub use illness_repo::IllnessRepo;
pub use ingredient_repo::IngredientRepo;
pub use medical_info_repo::MedicalInfoRepo;
pub use medication_alert_repo::MedicationAlertRepo;
pub use medication_cycle_repo::MedicationCycleRepo;
pub use medication_detail_repo::MedicationDetailRepo;
pub use medication_group_repo::MedicationGroupRepo;
pub use medication_record_repo::MedicationRecordRepo;
pub use medication_repo::MedicationRepo;
pub use prescription_medication_repo::PrescriptionMedicationRepo;
pub use prescription_repo::PrescriptionRepo;
pub use renewal_repo::RenewalRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
