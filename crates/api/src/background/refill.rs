//! Periodic refill check.
//!
//! Sends one push per active, push-agreeing user with details at or below
//! the low-stock threshold in an active cycle.

use std::sync::Arc;
use std::time::Duration;

use bokyak_core::analytics::DEFAULT_LOW_STOCK_THRESHOLD;
use bokyak_db::repositories::MedicationDetailRepo;
use bokyak_db::DbPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::notifications::{PushKind, PushNotifier};

const REFILL_TITLE: &str = "Prescription renewal";

pub(crate) fn refill_body(low_stock_count: i64) -> String {
    format!(
        "{low_stock_count} medication(s) are running low. Please renew your prescription."
    )
}

/// Notify every user running low. Returns the number of users notified.
pub async fn check_refill_requirements(
    pool: &DbPool,
    push: &PushNotifier,
) -> Result<usize, sqlx::Error> {
    let candidates =
        MedicationDetailRepo::refill_candidates(pool, DEFAULT_LOW_STOCK_THRESHOLD).await?;

    let mut notified = 0;
    for candidate in candidates.iter().filter(|c| c.low_stock_count > 0) {
        push.send(
            candidate.user_id,
            PushKind::RefillReminder,
            REFILL_TITLE,
            &refill_body(candidate.low_stock_count),
        );
        notified += 1;
    }
    Ok(notified)
}

/// Run the refill check loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    push: Arc<PushNotifier>,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs, "Refill check job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Refill check job stopping");
                break;
            }
            _ = interval.tick() => {
                match check_refill_requirements(&pool, &push).await {
                    Ok(0) => tracing::debug!("Refill check: nobody running low"),
                    Ok(users) => tracing::info!(users, "Refill reminders sent"),
                    Err(e) => tracing::error!(error = %e, "Refill check failed"),
                }
            }
        }
    }
}
