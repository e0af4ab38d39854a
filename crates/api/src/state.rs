use std::sync::Arc;

use bokyak_core::local_time::LocalClock;

use crate::config::ServerConfig;
use crate::notifications::PushNotifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bokyak_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Patient wall clock: defines "today" and slot hours.
    pub clock: LocalClock,
    /// Push notification delivery used by the reminder jobs.
    pub push: Arc<PushNotifier>,
}
