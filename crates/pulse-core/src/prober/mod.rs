mod http;

pub use http::HttpProber;

use async_trait::async_trait;

/// Outcome of one probe attempt against a monitored URL.
///
/// `status_code` is `None` when the request failed at the transport level
/// (timeout, DNS, connection refused) before an HTTP status was received.
/// Both a missing status and a non-200 status count as Down evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub status_code: Option<u16>,
}

impl ProbeResult {
    pub fn status(code: u16) -> Self {
        Self {
            status_code: Some(code),
        }
    }

    pub fn transport_failure() -> Self {
        Self { status_code: None }
    }

    /// Strict liveness rule: only an exact HTTP 200 counts as up.
    pub fn is_up(&self) -> bool {
        self.status_code == Some(200)
    }
}

/// Trait for issuing a single liveness probe against a URL.
///
/// Implementations must not propagate transport errors: every failure mode
/// maps to a [`ProbeResult`]. One call means exactly one request; retry
/// policy lives with the caller. Object-safe and Send + Sync for use across
/// async tasks.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_200_is_up() {
        assert!(ProbeResult::status(200).is_up());
        assert!(!ProbeResult::status(201).is_up());
        assert!(!ProbeResult::status(204).is_up());
        assert!(!ProbeResult::status(301).is_up());
        assert!(!ProbeResult::status(500).is_up());
        assert!(!ProbeResult::transport_failure().is_up());
    }
}
