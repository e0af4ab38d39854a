//! Integration tests for the alert window and the background job queries.

mod common;

use bokyak_core::alerts::{ALERT_APPOINTMENT, ALERT_DOSAGE};
use bokyak_core::types::DbId;
use bokyak_db::models::medication_alert::CreateMedicationAlert;
use bokyak_db::models::medication_cycle::UpdateMedicationCycle;
use bokyak_db::models::medication_group::UpdateMedicationGroup;
use bokyak_db::models::user::UpdateUser;
use bokyak_db::repositories::{
    MedicationAlertRepo, MedicationCycleRepo, MedicationDetailRepo, MedicationGroupRepo,
    UserRepo,
};
use chrono::NaiveTime;
use common::{create_chain, date, Chain};
use sqlx::PgPool;

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

async fn alert(pool: &PgPool, detail_id: DbId, alert_type: &str, time: NaiveTime, active: bool) {
    MedicationAlertRepo::create(
        pool,
        &CreateMedicationAlert {
            medication_detail_id: detail_id,
            alert_type: alert_type.to_string(),
            alert_time: time,
            is_active: Some(active),
            message: None,
        },
    )
    .await
    .unwrap();
}

async fn chain(pool: &PgPool, username: &str, item_seq: i64, stock: f64) -> Chain {
    create_chain(pool, username, item_seq, stock, date(2026, 3, 1)).await
}

async fn refuse_push(pool: &PgPool, user_id: DbId) {
    UserRepo::update(
        pool,
        user_id,
        &UpdateUser {
            display_name: None,
            push_agree: Some(false),
        },
    )
    .await
    .unwrap();
}

async fn mute_group(pool: &PgPool, c: &Chain) {
    MedicationGroupRepo::update(
        pool,
        c.group.id,
        c.user.id,
        &UpdateMedicationGroup {
            prescription_id: None,
            group_name: None,
            reminder_enabled: Some(false),
        },
    )
    .await
    .unwrap();
}

async fn close_cycle(pool: &PgPool, c: &Chain) {
    MedicationCycleRepo::update(
        pool,
        c.cycle.id,
        c.user.id,
        &UpdateMedicationCycle {
            cycle_start: None,
            cycle_end: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Upcoming window
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upcoming_window_wraps_midnight(pool: PgPool) {
    let c = chain(&pool, "nightowl", 6001, 30.0).await;
    let detail = c.detail.id;
    alert(&pool, detail, ALERT_DOSAGE, at(0, 15), true).await;
    alert(&pool, detail, ALERT_DOSAGE, at(23, 30), true).await;
    alert(&pool, detail, ALERT_DOSAGE, at(23, 45), false).await;
    alert(&pool, detail, ALERT_DOSAGE, at(12, 0), true).await;

    let late = MedicationAlertRepo::list_upcoming(&pool, c.user.id, at(23, 0), at(0, 30))
        .await
        .unwrap();
    let times: Vec<NaiveTime> = late.iter().map(|a| a.alert_time).collect();
    assert_eq!(times, vec![at(23, 30), at(0, 15)]);

    let early = MedicationAlertRepo::list_upcoming(&pool, c.user.id, at(0, 0), at(1, 0))
        .await
        .unwrap();
    let times: Vec<NaiveTime> = early.iter().map(|a| a.alert_time).collect();
    assert_eq!(times, vec![at(0, 15)]);

    let other = common::create_user(&pool, "stranger").await;
    let none = MedicationAlertRepo::list_upcoming(&pool, other.id, at(23, 0), at(0, 30))
        .await
        .unwrap();
    assert!(none.is_empty());
}

// ---------------------------------------------------------------------------
// Due reminders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_due_reminders_respect_every_filter(pool: PgPool) {
    let eligible = chain(&pool, "eligible", 6101, 30.0).await;
    alert(&pool, eligible.detail.id, ALERT_DOSAGE, at(8, 0), true).await;
    alert(&pool, eligible.detail.id, ALERT_DOSAGE, at(8, 0), true).await;
    alert(&pool, eligible.detail.id, ALERT_DOSAGE, at(8, 0), false).await;
    alert(&pool, eligible.detail.id, ALERT_APPOINTMENT, at(8, 0), true).await;
    alert(&pool, eligible.detail.id, ALERT_DOSAGE, at(9, 0), true).await;

    let muted = chain(&pool, "muted", 6102, 30.0).await;
    alert(&pool, muted.detail.id, ALERT_DOSAGE, at(8, 0), true).await;
    mute_group(&pool, &muted).await;

    let no_push = chain(&pool, "nopush", 6103, 30.0).await;
    alert(&pool, no_push.detail.id, ALERT_DOSAGE, at(8, 0), true).await;
    refuse_push(&pool, no_push.user.id).await;

    let closed = chain(&pool, "closed", 6104, 30.0).await;
    alert(&pool, closed.detail.id, ALERT_DOSAGE, at(8, 0), true).await;
    close_cycle(&pool, &closed).await;

    let gone = chain(&pool, "gone", 6105, 30.0).await;
    alert(&pool, gone.detail.id, ALERT_DOSAGE, at(8, 0), true).await;
    assert!(UserRepo::deactivate(&pool, gone.user.id).await.unwrap());

    let due = MedicationAlertRepo::due_reminders(&pool, "08:00").await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].user_id, eligible.user.id);
    assert_eq!(due[0].medication_count, 2);

    let due = MedicationAlertRepo::due_reminders(&pool, "09:00").await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].medication_count, 1);

    assert!(MedicationAlertRepo::due_reminders(&pool, "08:01")
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Refill candidates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refill_candidates_respect_every_filter(pool: PgPool) {
    let low = chain(&pool, "lowstock", 6201, 3.0).await;
    let at_threshold = chain(&pool, "edge", 6202, 5.0).await;
    chain(&pool, "stocked", 6203, 10.0).await;

    let no_push = chain(&pool, "quiet", 6204, 3.0).await;
    refuse_push(&pool, no_push.user.id).await;

    let closed = chain(&pool, "finished", 6205, 3.0).await;
    close_cycle(&pool, &closed).await;

    let gone = chain(&pool, "leaver", 6206, 3.0).await;
    assert!(UserRepo::deactivate(&pool, gone.user.id).await.unwrap());

    let candidates = MedicationDetailRepo::refill_candidates(&pool, 5.0).await.unwrap();
    let users: Vec<(DbId, i64)> = candidates
        .iter()
        .map(|c| (c.user_id, c.low_stock_count))
        .collect();
    assert_eq!(users, vec![(low.user.id, 1), (at_threshold.user.id, 1)]);
}
