//! Periodic dosage reminders.
//!
//! Every tick truncates the local wall clock to the minute and sends one
//! push per user whose active DOSAGE alerts are set for that minute.

use std::sync::Arc;
use std::time::Duration;

use bokyak_core::local_time::LocalClock;
use bokyak_db::repositories::MedicationAlertRepo;
use bokyak_db::DbPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::notifications::{PushKind, PushNotifier};

const REMINDER_TITLE: &str = "Medication reminder";

pub(crate) fn reminder_body(medication_count: i64) -> String {
    format!("You have {medication_count} medication(s) to take.")
}

/// Tracks the last local minute reminders went out for, so a late tick
/// landing in an already handled minute sends nothing.
#[derive(Debug, Default)]
pub(crate) struct MinuteGate {
    last: Option<String>,
}

impl MinuteGate {
    /// Returns `true` the first time `minute` is seen in a row.
    pub(crate) fn admit(&mut self, minute: &str) -> bool {
        if self.last.as_deref() == Some(minute) {
            return false;
        }
        self.last = Some(minute.to_string());
        true
    }
}

/// Send reminders for the local minute `minute` (`HH:MM`). Returns the
/// number of users notified.
pub async fn send_medication_reminders(
    pool: &DbPool,
    minute: &str,
    push: &PushNotifier,
) -> Result<usize, sqlx::Error> {
    let due = MedicationAlertRepo::due_reminders(pool, minute).await?;

    for reminder in &due {
        push.send(
            reminder.user_id,
            PushKind::DosageReminder,
            REMINDER_TITLE,
            &reminder_body(reminder.medication_count),
        );
    }
    Ok(due.len())
}

/// Run the reminder loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    clock: LocalClock,
    push: Arc<PushNotifier>,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs, "Medication reminder job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut gate = MinuteGate::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Medication reminder job stopping");
                break;
            }
            _ = interval.tick() => {
                let minute = clock.now().format("%H:%M").to_string();
                if !gate.admit(&minute) {
                    tracing::debug!(%minute, "Medication reminders: minute already handled");
                    continue;
                }
                match send_medication_reminders(&pool, &minute, &push).await {
                    Ok(0) => tracing::debug!("Medication reminders: nothing due"),
                    Ok(users) => tracing::info!(users, "Medication reminders sent"),
                    Err(e) => {
                        tracing::error!(error = %e, "Medication reminders: query failed");
                    }
                }
            }
        }
    }
}
