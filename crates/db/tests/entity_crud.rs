//! Integration tests for the repository layer.
//!
//! Exercises creation-time defaulting, stock accounting, ownership scoping
//! and constraint behaviour against a real database.

mod common;

use bokyak_db::models::hospital::CreateHospital;
use bokyak_db::models::medication_cycle::CreateMedicationCycle;
use bokyak_db::models::medication_detail::UpdateMedicationDetail;
use bokyak_db::models::medication_record::{CheckIn, CreateMedicationRecord};
use bokyak_db::models::prescription::CreatePrescription;
use bokyak_db::models::prescription_medication::CreatePrescriptionMedication;
use bokyak_db::models::session::CreateSession;
use bokyak_db::repositories::{
    HospitalRepo, MedicationCycleRepo, MedicationDetailRepo, MedicationGroupRepo,
    MedicationRecordRepo, PrescriptionMedicationRepo, PrescriptionRepo, SessionRepo,
};
use chrono::{Duration, Utc};
use common::{create_chain, create_hospital, create_user, date};
use sqlx::PgPool;

fn record(detail_id: i64, record_type: &str, quantity: f64) -> CreateMedicationRecord {
    CreateMedicationRecord {
        medication_detail_id: detail_id,
        record_type: Some(record_type.to_string()),
        record_date: None,
        quantity_taken: Some(quantity),
        notes: None,
        effectiveness_score: None,
        tags: None,
    }
}

async fn remaining(pool: &PgPool, detail_id: i64, user_id: i64) -> f64 {
    MedicationDetailRepo::find_by_id(pool, detail_id, user_id)
        .await
        .unwrap()
        .unwrap()
        .remaining_quantity
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_generated_codes_have_expected_lengths(pool: PgPool) {
    let chain = create_chain(&pool, "codes", 1001, 60.0, date(2026, 3, 1)).await;

    assert_eq!(chain.prescription.prescription_code.len(), 12);
    assert_eq!(chain.group.group_code.len(), 10);
    assert_eq!(chain.hospital.hospital_code.len(), 8);
    assert_eq!(chain.illness.illness_code.len(), 8);
    assert!(chain
        .prescription
        .prescription_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_remaining_defaults_to_prescribed_total(pool: PgPool) {
    let chain = create_chain(&pool, "defaults", 1002, 42.0, date(2026, 3, 1)).await;
    assert_eq!(chain.detail.remaining_quantity, 42.0);
    assert_eq!(chain.detail.patient_adjustments, serde_json::json!({}));
    assert!(chain.detail.actual_dosage_pattern.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_detail_pattern_override_can_be_cleared(pool: PgPool) {
    let chain = create_chain(&pool, "override", 1010, 30.0, date(2026, 3, 1)).await;
    let (detail, user) = (chain.detail.id, chain.user.id);
    let bedtime = serde_json::json!({"bedtime": {"enabled": true, "quantity": 1}});

    let updated = MedicationDetailRepo::update(
        &pool,
        detail,
        user,
        &UpdateMedicationDetail {
            actual_dosage_pattern: Some(Some(bedtime.clone())),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.actual_dosage_pattern, Some(bedtime.clone()));

    // Leaving the field out keeps the override.
    let updated = MedicationDetailRepo::update(
        &pool,
        detail,
        user,
        &UpdateMedicationDetail {
            remaining_quantity: Some(12.0),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.actual_dosage_pattern, Some(bedtime));
    assert_eq!(updated.remaining_quantity, 12.0);

    let updated = MedicationDetailRepo::update(
        &pool,
        detail,
        user,
        &UpdateMedicationDetail {
            actual_dosage_pattern: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(updated.actual_dosage_pattern.is_none());
    assert_eq!(updated.remaining_quantity, 12.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cycle_number_auto_increments_per_group(pool: PgPool) {
    let chain = create_chain(&pool, "cycles", 1003, 30.0, date(2026, 3, 1)).await;
    assert_eq!(chain.cycle.cycle_number, 1);

    let second = MedicationCycleRepo::create(
        &pool,
        &CreateMedicationCycle {
            group_id: chain.group.id,
            cycle_number: None,
            cycle_start: date(2026, 4, 1),
            cycle_end: None,
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(second.cycle_number, 2);

    // Duplicate explicit number violates the unique constraint.
    let duplicate = MedicationCycleRepo::create(
        &pool,
        &CreateMedicationCycle {
            group_id: chain.group.id,
            cycle_number: Some(2),
            cycle_start: date(2026, 5, 1),
            cycle_end: None,
            is_active: None,
        },
    )
    .await;
    assert!(duplicate.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prescription_count_follows_previous(pool: PgPool) {
    let chain = create_chain(&pool, "counts", 1004, 30.0, date(2026, 3, 1)).await;
    assert_eq!(chain.prescription.prescription_count, 0);

    let next = PrescriptionRepo::create(
        &pool,
        chain.user.id,
        &CreatePrescription {
            prescription_date: date(2026, 4, 1),
            previous_prescription_id: Some(chain.prescription.id),
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(next.prescription_count, 1);
    assert_eq!(next.previous_prescription_id, Some(chain.prescription.id));

    let third = PrescriptionRepo::create(
        &pool,
        chain.user.id,
        &CreatePrescription {
            prescription_date: date(2026, 5, 1),
            previous_prescription_id: Some(next.id),
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(third.prescription_count, 2);
}

// ---------------------------------------------------------------------------
// Stock accounting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_taken_record_decrements_remaining(pool: PgPool) {
    let chain = create_chain(&pool, "taken", 1005, 10.0, date(2026, 3, 1)).await;

    MedicationRecordRepo::create(&pool, &record(chain.detail.id, "TAKEN", 2.0))
        .await
        .unwrap();
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 8.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_taken_record_floors_remaining_at_zero(pool: PgPool) {
    let chain = create_chain(&pool, "floor", 1006, 1.0, date(2026, 3, 1)).await;

    MedicationRecordRepo::create(&pool, &record(chain.detail.id, "TAKEN", 3.0))
        .await
        .unwrap();
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_record_types_leave_remaining_unchanged(pool: PgPool) {
    let chain = create_chain(&pool, "missed", 1007, 10.0, date(2026, 3, 1)).await;

    for record_type in ["MISSED", "SKIPPED", "SIDE_EFFECT", "NOTE"] {
        MedicationRecordRepo::create(&pool, &record(chain.detail.id, record_type, 1.0))
            .await
            .unwrap();
    }
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 10.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_defaults(pool: PgPool) {
    let chain = create_chain(&pool, "recdefaults", 1008, 10.0, date(2026, 3, 1)).await;

    let created = MedicationRecordRepo::create(
        &pool,
        &CreateMedicationRecord {
            medication_detail_id: chain.detail.id,
            record_type: None,
            record_date: None,
            quantity_taken: None,
            notes: None,
            effectiveness_score: None,
            tags: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(created.record_type, "TAKEN");
    assert_eq!(created.quantity_taken, 0.0);
    assert_eq!(created.notes, "");
    assert_eq!(created.tags, serde_json::json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_record_type_rejected_by_check(pool: PgPool) {
    let chain = create_chain(&pool, "badtype", 1009, 10.0, date(2026, 3, 1)).await;

    let result = MedicationRecordRepo::create(&pool, &record(chain.detail.id, "EATEN", 1.0)).await;
    let err = result.unwrap_err();
    let code = err
        .as_database_error()
        .and_then(|e| e.code())
        .map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("23514"));
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 10.0);
}

// ---------------------------------------------------------------------------
// Daily check-in
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_in_is_idempotent_per_day(pool: PgPool) {
    let chain = create_chain(&pool, "checkin", 1010, 10.0, date(2026, 3, 1)).await;
    let now = Utc::now();
    let day_start = now - Duration::hours(1);
    let day_end = now + Duration::hours(1);

    let first = MedicationRecordRepo::check_in(
        &pool,
        &CheckIn {
            medication_detail_id: chain.detail.id,
            record_type: "TAKEN".to_string(),
            quantity_taken: 1.0,
            notes: String::new(),
        },
        day_start,
        day_end,
        now,
    )
    .await
    .unwrap();
    assert!(first.created);
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 9.0);

    let second = MedicationRecordRepo::check_in(
        &pool,
        &CheckIn {
            medication_detail_id: chain.detail.id,
            record_type: "TAKEN".to_string(),
            quantity_taken: 1.0,
            notes: "again".to_string(),
        },
        day_start,
        day_end,
        now,
    )
    .await
    .unwrap();
    assert!(!second.created);
    assert_eq!(second.record.id, first.record.id);
    assert_eq!(second.record.notes, "again");
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 9.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_in_updates_type_of_existing_record(pool: PgPool) {
    let chain = create_chain(&pool, "retype", 1011, 10.0, date(2026, 3, 1)).await;
    let now = Utc::now();

    let missed = CheckIn {
        medication_detail_id: chain.detail.id,
        record_type: "MISSED".to_string(),
        quantity_taken: 0.0,
        notes: String::new(),
    };
    MedicationRecordRepo::check_in(
        &pool,
        &missed,
        now - Duration::hours(1),
        now + Duration::hours(1),
        now,
    )
    .await
    .unwrap();

    let taken = CheckIn {
        record_type: "TAKEN".to_string(),
        quantity_taken: 1.0,
        ..missed
    };
    let outcome = MedicationRecordRepo::check_in(
        &pool,
        &taken,
        now - Duration::hours(1),
        now + Duration::hours(1),
        now,
    )
    .await
    .unwrap();

    assert!(!outcome.created);
    assert_eq!(outcome.record.record_type, "TAKEN");
    // Updating an existing record never consumes stock.
    assert_eq!(remaining(&pool, chain.detail.id, chain.user.id).await, 10.0);
}

// ---------------------------------------------------------------------------
// Ownership scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookups_are_scoped_to_owner(pool: PgPool) {
    let chain = create_chain(&pool, "owner", 1012, 10.0, date(2026, 3, 1)).await;
    let other = create_user(&pool, "intruder").await;

    assert!(PrescriptionRepo::find_by_id(&pool, chain.prescription.id, other.id)
        .await
        .unwrap()
        .is_none());
    assert!(MedicationGroupRepo::find_by_id(&pool, chain.group.id, other.id)
        .await
        .unwrap()
        .is_none());
    assert!(MedicationDetailRepo::find_by_id(&pool, chain.detail.id, other.id)
        .await
        .unwrap()
        .is_none());
    assert!(!MedicationDetailRepo::delete(&pool, chain.detail.id, other.id)
        .await
        .unwrap());

    assert_eq!(
        MedicationDetailRepo::owner_id(&pool, chain.detail.id).await.unwrap(),
        Some(chain.user.id)
    );
    assert_eq!(MedicationDetailRepo::owner_id(&pool, i64::MAX).await.unwrap(), None);
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_hosp_code_per_user_rejected(pool: PgPool) {
    let user = create_user(&pool, "dupes").await;
    create_hospital(&pool, user.id, "H100").await;

    let input = CreateHospital {
        hosp_code: "H100".to_string(),
        hosp_name: "Another".to_string(),
        hosp_type: None,
        doctor_name: None,
        address: None,
        phone_number: None,
    };
    assert!(HospitalRepo::create(&pool, user.id, &input).await.is_err());

    // Upsert with the same key updates in place.
    let upserted = HospitalRepo::upsert(&pool, user.id, &input).await.unwrap();
    assert_eq!(upserted.hosp_name, "Another");
    assert_eq!(HospitalRepo::list_for_user(&pool, user.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_medication_in_prescription_rejected(pool: PgPool) {
    let chain = create_chain(&pool, "dupmed", 1013, 10.0, date(2026, 3, 1)).await;

    let result = PrescriptionMedicationRepo::create(
        &pool,
        &CreatePrescriptionMedication {
            prescription_id: chain.prescription.id,
            group_id: None,
            medication_id: chain.line.medication_id,
            standard_dosage_pattern: serde_json::json!({}),
            duration_days: 7,
            total_quantity: 7.0,
        },
    )
    .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Schedule rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_schedule_rows_pick_latest_cycle_and_day_record(pool: PgPool) {
    let now = Utc::now();
    let today = now.date_naive();
    let chain = create_chain(&pool, "schedule", 1014, 10.0, today - Duration::days(1)).await;

    MedicationRecordRepo::create(&pool, &record(chain.detail.id, "TAKEN", 1.0))
        .await
        .unwrap();

    let rows = MedicationDetailRepo::schedule_rows(
        &pool,
        chain.user.id,
        today,
        now - Duration::hours(1),
        now + Duration::hours(1),
        None,
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cycle_id, chain.cycle.id);
    assert_eq!(rows[0].record_type.as_deref(), Some("TAKEN"));

    let groups = bokyak_db::models::medication_detail::group_schedule_rows(rows);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].details.len(), 1);
    assert!(groups[0].details[0].day_record.is_some());

    // A record outside the window is not attached.
    let rows = MedicationDetailRepo::schedule_rows(
        &pool,
        chain.user.id,
        today,
        now + Duration::hours(2),
        now + Duration::hours(3),
        None,
    )
    .await
    .unwrap();
    assert!(rows[0].record_type.is_none());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

fn session_for(user_id: i64, hash: &str) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + Duration::days(7),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_rotation_happens_once(pool: PgPool) {
    let user = create_user(&pool, "rotating").await;
    let first = SessionRepo::open(&pool, &session_for(user.id, "hash-1"))
        .await
        .unwrap();

    let second = SessionRepo::rotate(&pool, first.id, &session_for(user.id, "hash-2"))
        .await
        .unwrap()
        .expect("first rotation succeeds");
    assert!(SessionRepo::find_active(&pool, "hash-1").await.unwrap().is_none());
    assert_eq!(
        SessionRepo::find_active(&pool, "hash-2").await.unwrap().map(|s| s.id),
        Some(second.id)
    );

    // Replaying the revoked session opens nothing.
    let replay = SessionRepo::rotate(&pool, first.id, &session_for(user.id, "hash-3"))
        .await
        .unwrap();
    assert!(replay.is_none());
    assert!(SessionRepo::find_active(&pool, "hash-3").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_session_is_not_active(pool: PgPool) {
    let user = create_user(&pool, "expired").await;
    let mut input = session_for(user.id, "stale");
    input.expires_at = Utc::now() - Duration::minutes(1);
    SessionRepo::open(&pool, &input).await.unwrap();

    assert!(SessionRepo::find_active(&pool, "stale").await.unwrap().is_none());
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 1);
}
