//! Fire-and-forget push delivery over HTTP.
//!
//! When `PUSH_GATEWAY_URL` is set each notification is POSTed as
//! `{user_id, kind, title, body}`. Failures are logged and never retried.

use std::time::Duration;

use bokyak_core::types::DbId;
use serde::Serialize;

use crate::config::ServerConfig;

/// HTTP request timeout for a single delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What a push is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushKind {
    DosageReminder,
    RefillReminder,
}

/// JSON body sent to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub user_id: DbId,
    pub kind: PushKind,
    pub title: String,
    pub body: String,
}

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

/// Delivers push notifications to the configured gateway.
pub struct PushNotifier {
    client: reqwest::Client,
    gateway_url: Option<String>,
}

impl PushNotifier {
    /// Create a notifier. `None` logs notifications instead of sending them.
    pub fn new(gateway_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            gateway_url,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.push_gateway_url.clone())
    }

    /// Whether notifications leave the process.
    pub fn is_remote(&self) -> bool {
        self.gateway_url.is_some()
    }

    /// Queue one notification for `user_id`. Returns immediately.
    pub fn send(&self, user_id: DbId, kind: PushKind, title: &str, body: &str) {
        let payload = PushPayload {
            user_id,
            kind,
            title: title.to_string(),
            body: body.to_string(),
        };

        let Some(url) = self.gateway_url.clone() else {
            tracing::info!(
                user_id,
                kind = ?payload.kind,
                title = %payload.title,
                body = %payload.body,
                "Push notification (no gateway configured)"
            );
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = deliver(&client, &url, &payload).await {
                tracing::warn!(
                    user_id = payload.user_id,
                    kind = ?payload.kind,
                    error = %e,
                    "Push delivery failed"
                );
            }
        });
    }
}

/// Execute a single POST request and check the response status.
async fn deliver(
    client: &reqwest::Client,
    url: &str,
    payload: &PushPayload,
) -> Result<(), PushError> {
    let response = client.post(url).json(payload).send().await?;
    if !response.status().is_success() {
        return Err(PushError::HttpStatus(response.status().as_u16()));
    }
    Ok(())
}
