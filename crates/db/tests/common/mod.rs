//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use bokyak_core::types::DbId;
use bokyak_db::models::hospital::{CreateHospital, Hospital};
use bokyak_db::models::illness::{CreateIllness, Illness};
use bokyak_db::models::medical_info::{CreateMedicalInfo, UserMedicalInfo};
use bokyak_db::models::medication::{CreateMedication, Medication};
use bokyak_db::models::medication_cycle::{CreateMedicationCycle, MedicationCycle};
use bokyak_db::models::medication_detail::{CreateMedicationDetail, MedicationDetail};
use bokyak_db::models::medication_group::{CreateMedicationGroup, MedicationGroup};
use bokyak_db::models::prescription::{CreatePrescription, Prescription};
use bokyak_db::models::prescription_medication::{
    CreatePrescriptionMedication, PrescriptionMedication,
};
use bokyak_db::models::user::{CreateUser, User};
use bokyak_db::repositories::{
    HospitalRepo, IllnessRepo, MedicalInfoRepo, MedicationCycleRepo, MedicationDetailRepo,
    MedicationGroupRepo, MedicationRepo, PrescriptionMedicationRepo, PrescriptionRepo, UserRepo,
};
use chrono::NaiveDate;
use serde_json::json;
use sqlx::PgPool;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn morning_and_evening() -> serde_json::Value {
    json!({
        "morning": {"enabled": true, "quantity": 1, "unit": "tablet"},
        "evening": {"enabled": true, "quantity": 1, "unit": "tablet"},
        "prn": {"enabled": false}
    })
}

pub async fn create_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            display_name: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: "patient".to_string(),
            push_agree: true,
        },
    )
    .await
    .unwrap()
}

pub async fn create_hospital(pool: &PgPool, user_id: DbId, hosp_code: &str) -> Hospital {
    HospitalRepo::create(
        pool,
        user_id,
        &CreateHospital {
            hosp_code: hosp_code.to_string(),
            hosp_name: format!("Clinic {hosp_code}"),
            hosp_type: None,
            doctor_name: None,
            address: None,
            phone_number: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_illness(pool: &PgPool, user_id: DbId, name: &str) -> Illness {
    IllnessRepo::create(
        pool,
        user_id,
        &CreateIllness {
            ill_type: None,
            ill_name: name.to_string(),
            ill_code: None,
            ill_start: None,
            ill_end: None,
            is_chronic: Some(true),
        },
    )
    .await
    .unwrap()
}

pub async fn create_medication(pool: &PgPool, item_seq: i64, name: &str) -> Medication {
    MedicationRepo::create(
        pool,
        &CreateMedication {
            item_seq,
            item_name: name.to_string(),
            entp_name: Some("Pharma Co".to_string()),
            item_image: None,
            class_name: None,
            dosage_form: None,
            is_prescription: None,
        },
    )
    .await
    .unwrap()
}

/// A user's full chain down to one detail with the given stock.
pub struct Chain {
    pub user: User,
    pub hospital: Hospital,
    pub illness: Illness,
    pub prescription: Prescription,
    pub medical_info: UserMedicalInfo,
    pub group: MedicationGroup,
    pub line: PrescriptionMedication,
    pub cycle: MedicationCycle,
    pub detail: MedicationDetail,
}

pub async fn create_chain(
    pool: &PgPool,
    username: &str,
    item_seq: i64,
    total_quantity: f64,
    cycle_start: NaiveDate,
) -> Chain {
    let user = create_user(pool, username).await;
    let hospital = create_hospital(pool, user.id, "H001").await;
    let illness = create_illness(pool, user.id, "Hypertension").await;
    create_medication(pool, item_seq, &format!("Drug {item_seq}")).await;

    let prescription = PrescriptionRepo::create(
        pool,
        user.id,
        &CreatePrescription {
            prescription_date: cycle_start,
            previous_prescription_id: None,
            is_active: None,
        },
    )
    .await
    .unwrap();

    let medical_info = MedicalInfoRepo::create(
        pool,
        user.id,
        &CreateMedicalInfo {
            hospital_id: hospital.id,
            illness_id: illness.id,
            prescription_id: Some(prescription.id),
            is_primary: None,
        },
    )
    .await
    .unwrap();

    let group = MedicationGroupRepo::create(
        pool,
        &CreateMedicationGroup {
            medical_info_id: medical_info.id,
            prescription_id: Some(prescription.id),
            group_name: "Blood pressure".to_string(),
            reminder_enabled: None,
        },
    )
    .await
    .unwrap();

    let line = PrescriptionMedicationRepo::create(
        pool,
        &CreatePrescriptionMedication {
            prescription_id: prescription.id,
            group_id: Some(group.id),
            medication_id: item_seq,
            standard_dosage_pattern: morning_and_evening(),
            duration_days: 30,
            total_quantity,
        },
    )
    .await
    .unwrap();

    let cycle = MedicationCycleRepo::create(
        pool,
        &CreateMedicationCycle {
            group_id: group.id,
            cycle_number: None,
            cycle_start,
            cycle_end: None,
            is_active: None,
        },
    )
    .await
    .unwrap();

    let detail = MedicationDetailRepo::create(
        pool,
        &CreateMedicationDetail {
            cycle_id: cycle.id,
            prescription_medication_id: line.id,
            actual_dosage_pattern: None,
            remaining_quantity: None,
            patient_adjustments: None,
        },
    )
    .await
    .unwrap();

    Chain {
        user,
        hospital,
        illness,
        prescription,
        medical_info,
        group,
        line,
        cycle,
        detail,
    }
}
