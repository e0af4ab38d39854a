//! Periodic jobs that run beside the HTTP server.
//!
//! - [`reminders`]: pushes dosage reminders whose alert time is now.
//! - [`refill`]: pushes refill reminders for details running low.
//!
//! [`BackgroundJobs::spawn`] starts both on one [`TaskTracker`] so shutdown
//! can cancel them together and wait for in-flight ticks to finish.

pub mod refill;
pub mod reminders;

use std::sync::Arc;
use std::time::Duration;

use bokyak_core::local_time::LocalClock;
use bokyak_db::DbPool;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
use crate::notifications::PushNotifier;

/// Handle to the running jobs.
pub struct BackgroundJobs {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl BackgroundJobs {
    pub fn spawn(
        pool: &DbPool,
        clock: LocalClock,
        push: &Arc<PushNotifier>,
        config: &ServerConfig,
    ) -> Self {
        let tracker = TaskTracker::new();
        let cancel = CancellationToken::new();

        tracker.spawn(reminders::run(
            pool.clone(),
            clock,
            Arc::clone(push),
            config.reminder_interval_secs,
            cancel.clone(),
        ));
        tracker.spawn(refill::run(
            pool.clone(),
            Arc::clone(push),
            config.refill_check_interval_secs,
            cancel.clone(),
        ));
        tracker.close();

        tracing::info!(jobs = tracker.len(), "Background jobs started");
        Self { tracker, cancel }
    }

    /// Cancel every job and wait up to `grace` for them to return.
    pub async fn shutdown(self, grace: Duration) {
        self.cancel.cancel();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            tracing::warn!(
                remaining = self.tracker.len(),
                "Background jobs did not stop within the grace period"
            );
        } else {
            tracing::info!("Background jobs stopped");
        }
    }
}
