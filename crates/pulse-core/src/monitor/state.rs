use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::prober::ProbeResult;

/// A configured endpoint-to-webhook pairing to be health-checked.
///
/// Built once at startup from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: String,
    pub url: String,
    pub webhook_url: String,
}

impl Monitor {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        webhook_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            webhook_url: webhook_url.into(),
        }
    }
}

/// Binary liveness conclusion for a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Up,
    Down,
}

impl Verdict {
    pub fn from_probe(result: ProbeResult) -> Self {
        if result.is_up() {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Lifecycle of the in-process check runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Active,
    Stopping,
    Stopped,
}

/// Outcome summary for one monitor's pipeline within a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub monitor_id: String,
    pub url: String,
    pub verdict: Verdict,
    /// Total probe attempts made, including the first one.
    pub attempts: u32,
    /// Status code of the last probe, if one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
    pub webhook_delivered: bool,
    pub checked_at: DateTime<Utc>,
}
