use std::time::Duration;

use tracing::{debug, warn};

use crate::config::CheckConfig;
use crate::monitor::state::Verdict;
use crate::prober::Prober;

/// Bounded fixed-delay retry policy for liveness probes.
///
/// A single failed probe is weak evidence of an outage, so a non-200 first
/// attempt is followed by up to `max_retries` further attempts, each preceded
/// by a fixed non-blocking delay. Attempts against one URL are strictly
/// sequential so a struggling endpoint never sees overlapping probes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &CheckConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }

    /// Resolve a URL to a final verdict by probing under this policy.
    ///
    /// Returns on the first 200, or after `1 + max_retries` non-200 attempts.
    pub async fn resolve(&self, prober: &dyn Prober, url: &str) -> Resolution {
        let first = prober.probe(url).await;
        if first.is_up() {
            debug!(url, "Endpoint up on first attempt");
            return Resolution {
                verdict: Verdict::Up,
                attempts: 1,
                last_status: first.status_code,
            };
        }

        warn!(url, status = ?first.status_code, "Endpoint down, starting retries");

        let mut attempts = 1u32;
        let mut last = first;

        for retry in 1..=self.max_retries {
            tokio::time::sleep(self.delay).await;

            let result = prober.probe(url).await;
            attempts += 1;

            if result.is_up() {
                debug!(url, attempts, "Endpoint recovered during retries");
                return Resolution {
                    verdict: Verdict::Up,
                    attempts,
                    last_status: result.status_code,
                };
            }

            warn!(url, retry, status = ?result.status_code, "Endpoint still down");
            last = result;
        }

        Resolution {
            verdict: Verdict::Down,
            attempts,
            last_status: last.status_code,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CheckConfig::default())
    }
}

/// Final outcome of probing one URL under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub verdict: Verdict,
    /// Total probe attempts made, including the first one.
    pub attempts: u32,
    pub last_status: Option<u16>,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::prober::ProbeResult;

    /// Replays a fixed sequence of probe results, repeating the last one.
    struct ScriptedProber {
        calls: Arc<AtomicUsize>,
        results: Vec<ProbeResult>,
    }

    impl ScriptedProber {
        fn new(results: Vec<ProbeResult>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    results,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, _url: &str) -> ProbeResult {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.results[n.min(self.results.len() - 1)]
        }
    }

    #[tokio::test(start_paused = true)]
    async fn up_on_first_attempt_makes_exactly_one_call() {
        let (prober, calls) = ScriptedProber::new(vec![ProbeResult::status(200)]);
        let policy = RetryPolicy::new(5, Duration::from_secs(5));

        let resolution = policy.resolve(&prober, "https://example.com").await;

        assert_eq!(resolution.verdict, Verdict::Up);
        assert_eq!(resolution.attempts, 1);
        assert_eq!(resolution.last_status, Some(200));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_make_exactly_six_calls() {
        let (prober, calls) = ScriptedProber::new(vec![ProbeResult::status(500)]);
        let policy = RetryPolicy::new(5, Duration::from_secs(5));

        let resolution = policy.resolve(&prober, "https://example.com").await;

        assert_eq!(resolution.verdict, Verdict::Down);
        assert_eq!(resolution.attempts, 6);
        assert_eq!(resolution.last_status, Some(500));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn recovery_on_fourth_attempt_stops_retrying() {
        let (prober, calls) = ScriptedProber::new(vec![
            ProbeResult::transport_failure(),
            ProbeResult::status(502),
            ProbeResult::transport_failure(),
            ProbeResult::status(200),
        ]);
        let policy = RetryPolicy::new(5, Duration::from_secs(5));

        let resolution = policy.resolve(&prober, "https://example.com").await;

        assert_eq!(resolution.verdict, Verdict::Up);
        assert_eq!(resolution.attempts, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_exhaust_like_http_errors() {
        let (prober, calls) = ScriptedProber::new(vec![ProbeResult::transport_failure()]);
        let policy = RetryPolicy::new(5, Duration::from_secs(5));

        let resolution = policy.resolve(&prober, "https://example.com").await;

        assert_eq!(resolution.verdict, Verdict::Down);
        assert_eq!(resolution.attempts, 6);
        assert_eq!(resolution.last_status, None);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn non_200_success_codes_are_down() {
        let (prober, _) = ScriptedProber::new(vec![ProbeResult::status(204)]);
        let policy = RetryPolicy::new(2, Duration::from_secs(5));

        let resolution = policy.resolve(&prober, "https://example.com").await;

        assert_eq!(resolution.verdict, Verdict::Down);
        assert_eq!(resolution.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_wait_the_configured_delay() {
        let (prober, _) = ScriptedProber::new(vec![ProbeResult::status(500)]);
        let policy = RetryPolicy::new(5, Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        policy.resolve(&prober, "https://example.com").await;

        // 5 retries, each preceded by a 5s pause (auto-advanced paused clock).
        assert_eq!(started.elapsed(), Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_resolves_after_single_attempt() {
        let (prober, calls) = ScriptedProber::new(vec![ProbeResult::status(500)]);
        let policy = RetryPolicy::new(0, Duration::from_secs(5));

        let resolution = policy.resolve(&prober, "https://example.com").await;

        assert_eq!(resolution.verdict, Verdict::Down);
        assert_eq!(resolution.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
