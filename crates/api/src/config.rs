use std::str::FromStr;

use bokyak_core::local_time::{LocalClock, DEFAULT_UTC_OFFSET_HOURS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background jobs to stop (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Patient wall-clock offset from UTC in hours (default: `9`, KST).
    pub local_utc_offset_hours: i32,
    /// Dosage reminder sweep interval in seconds (default: `60`).
    pub reminder_interval_secs: u64,
    /// Refill check interval in seconds (default: `86400`).
    pub refill_check_interval_secs: u64,
    /// Push gateway endpoint. Notifications are only logged when unset.
    pub push_gateway_url: Option<String>,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                       |
    /// | `LOCAL_UTC_OFFSET_HOURS`     | `9`                        |
    /// | `REMINDER_INTERVAL_SECS`     | `60`                       |
    /// | `REFILL_CHECK_INTERVAL_SECS` | `86400`                    |
    /// | `PUSH_GATEWAY_URL`           | unset                      |
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let push_gateway_url = std::env::var("PUSH_GATEWAY_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            local_utc_offset_hours: env_or("LOCAL_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS),
            reminder_interval_secs: env_or("REMINDER_INTERVAL_SECS", 60),
            refill_check_interval_secs: env_or("REFILL_CHECK_INTERVAL_SECS", 86_400),
            push_gateway_url,
            jwt: JwtConfig::from_env(),
        }
    }

    /// The wall clock defined by `local_utc_offset_hours`.
    ///
    /// # Panics
    ///
    /// Panics if the offset is outside `-23..=23`.
    pub fn clock(&self) -> LocalClock {
        LocalClock::from_offset_hours(self.local_utc_offset_hours)
            .unwrap_or_else(|e| panic!("Invalid LOCAL_UTC_OFFSET_HOURS: {e}"))
    }
}

/// Parse `key` from the environment, or `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse as `T`.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
