//! Push notification delivery.
//!
//! [`PushNotifier`] hands reminder and refill notices to an external push
//! gateway, or logs them when no gateway is configured.

pub mod push;

pub use push::{PushKind, PushNotifier};
