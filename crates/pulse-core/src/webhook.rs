//! Webhook notification dispatch.
//!
//! Once a monitor's verdict is known, the orchestrator POSTs a small JSON
//! payload to that monitor's webhook URL. Delivery is best-effort: failures
//! are surfaced as [`NotifyError`] for the caller to log and absorb, never
//! retried and never allowed to influence verdicts.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::CheckConfig;
use crate::monitor::state::Verdict;
use crate::prober::HttpProber;

/// Wire representation of a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Up,
    Down,
}

impl From<Verdict> for Trigger {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Up => Self::Up,
            Verdict::Down => Self::Down,
        }
    }
}

/// The JSON body POSTed to webhook endpoints: `{"trigger":"up"|"down"}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NotificationPayload {
    pub trigger: Trigger,
}

impl NotificationPayload {
    pub fn from_verdict(verdict: Verdict) -> Self {
        Self {
            trigger: verdict.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// POSTs verdict notifications over a shared pooled client.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &CheckConfig) -> Self {
        Self::new(
            HttpProber::build_client(config.webhook_timeout),
            config.webhook_timeout,
        )
    }

    /// Deliver one notification. One POST, no retry, response body discarded.
    pub async fn notify(&self, url: &str, verdict: Verdict) -> Result<(), NotifyError> {
        let payload = NotificationPayload::from_verdict(verdict);
        let body = serde_json::to_vec(&payload)?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(NotifyError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        debug!(url, trigger = %verdict, "Webhook delivered");
        Ok(())
    }
}
