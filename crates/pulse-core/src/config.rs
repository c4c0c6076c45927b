use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for one check cycle and its scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Interval between scheduled check cycles (default: 60s).
    pub tick_interval: Duration,
    /// HTTP request timeout for a single probe.
    pub request_timeout: Duration,
    /// Additional probe attempts after a failed first attempt (default: 5).
    pub max_retries: u32,
    /// Fixed delay between consecutive probe attempts (default: 5s).
    pub retry_delay: Duration,
    /// HTTP request timeout for webhook delivery.
    pub webhook_timeout: Duration,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            request_timeout: Duration::from_secs(10),
            max_retries: 5,
            retry_delay: Duration::from_secs(5),
            webhook_timeout: Duration::from_secs(5),
        }
    }
}

impl CheckConfig {
    pub fn with_tick_interval(mut self, secs: u64) -> Self {
        self.tick_interval = Duration::from_secs(secs);
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_webhook_timeout(mut self, secs: u64) -> Self {
        self.webhook_timeout = Duration::from_secs(secs);
        self
    }
}
