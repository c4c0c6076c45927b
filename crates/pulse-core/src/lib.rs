#![forbid(unsafe_code)]

pub mod config;
pub mod monitor;
pub mod prober;
pub mod webhook;

pub use config::CheckConfig;
pub use monitor::{
    Monitor, MonitorReport, Orchestrator, Resolution, RetryPolicy, RunnerState, Verdict,
};
pub use prober::{HttpProber, ProbeResult, Prober};
pub use webhook::{NotificationPayload, NotifyError, Trigger, WebhookNotifier};
