//! Integration tests for superseding and sharing prescriptions.

mod common;

use bokyak_core::renewal::PrescribedMedication;
use bokyak_db::models::medical_info::CreateMedicalInfo;
use bokyak_db::models::prescription::CreateSharedPrescription;
use bokyak_db::repositories::{
    MedicalInfoRepo, MedicationGroupRepo, PrescriptionMedicationRepo, PrescriptionRepo,
};
use common::{create_chain, create_illness, create_medication, date, morning_and_evening};
use sqlx::PgPool;

fn line(medication_id: i64) -> PrescribedMedication {
    PrescribedMedication {
        medication_id,
        dosage_pattern: morning_and_evening(),
        duration_days: 14,
        total_quantity: 28.0,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supersede_repoints_groups_and_infos(pool: PgPool) {
    let chain = create_chain(&pool, "superseder", 5001, 60.0, date(2026, 3, 1)).await;
    create_medication(&pool, 5002, "Drug 5002").await;

    let successor = PrescriptionRepo::supersede(
        &pool,
        chain.prescription.id,
        chain.user.id,
        date(2026, 4, 1),
        &[line(5002)],
    )
    .await
    .unwrap()
    .expect("owned prescription is superseded");

    assert!(successor.is_active);
    assert_eq!(successor.previous_prescription_id, Some(chain.prescription.id));
    assert_eq!(successor.prescription_count, 1);
    assert_eq!(successor.prescription_date, date(2026, 4, 1));

    let old = PrescriptionRepo::find_by_id(&pool, chain.prescription.id, chain.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!old.is_active);

    let group = MedicationGroupRepo::find_by_id(&pool, chain.group.id, chain.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.prescription_id, Some(successor.id));

    let info = MedicalInfoRepo::find_by_id(&pool, chain.medical_info.id, chain.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.prescription_id, Some(successor.id));

    let lines = PrescriptionMedicationRepo::list_for_user(&pool, chain.user.id, Some(successor.id))
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].medication_id, 5002);
    assert_eq!(lines[0].group_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supersede_rolls_back_on_failure(pool: PgPool) {
    let chain = create_chain(&pool, "halfway", 5003, 60.0, date(2026, 3, 1)).await;

    // Medication 888888 is not registered: the line insert fails after the
    // old prescription was already deactivated inside the transaction.
    let result = PrescriptionRepo::supersede(
        &pool,
        chain.prescription.id,
        chain.user.id,
        date(2026, 4, 1),
        &[line(888_888)],
    )
    .await;
    assert!(result.is_err());

    let old = PrescriptionRepo::find_by_id(&pool, chain.prescription.id, chain.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(old.is_active);

    let group = MedicationGroupRepo::find_by_id(&pool, chain.group.id, chain.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.prescription_id, Some(chain.prescription.id));

    let prescriptions = PrescriptionRepo::list_for_user(&pool, chain.user.id).await.unwrap();
    assert_eq!(prescriptions.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supersede_of_foreign_prescription_is_none(pool: PgPool) {
    let owner = create_chain(&pool, "rxowner", 5004, 60.0, date(2026, 3, 1)).await;
    let other = common::create_user(&pool, "rxthief").await;

    let result = PrescriptionRepo::supersede(
        &pool,
        owner.prescription.id,
        other.id,
        date(2026, 4, 1),
        &[],
    )
    .await
    .unwrap();
    assert!(result.is_none());

    let old = PrescriptionRepo::find_by_id(&pool, owner.prescription.id, owner.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(old.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shared_prescription_links_every_info(pool: PgPool) {
    let chain = create_chain(&pool, "sharer", 5005, 60.0, date(2026, 3, 1)).await;
    let diabetes = create_illness(&pool, chain.user.id, "Diabetes").await;
    let second_info = MedicalInfoRepo::create(
        &pool,
        chain.user.id,
        &CreateMedicalInfo {
            hospital_id: chain.hospital.id,
            illness_id: diabetes.id,
            prescription_id: None,
            is_primary: None,
        },
    )
    .await
    .unwrap();

    let shared = PrescriptionRepo::create_shared(
        &pool,
        chain.user.id,
        &CreateSharedPrescription {
            prescription_date: date(2026, 4, 2),
            medical_info_ids: vec![chain.medical_info.id, second_info.id],
            medications: vec![line(5005)],
        },
    )
    .await
    .unwrap();
    assert!(shared.is_active);
    assert_eq!(shared.prescription_count, 0);

    for info_id in [chain.medical_info.id, second_info.id] {
        let info = MedicalInfoRepo::find_by_id(&pool, info_id, chain.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.prescription_id, Some(shared.id));
    }
}
