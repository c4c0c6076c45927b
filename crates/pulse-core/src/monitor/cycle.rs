use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::CheckConfig;
use crate::monitor::retry::RetryPolicy;
use crate::monitor::state::{Monitor, MonitorReport, RunnerState, Verdict};
use crate::prober::Prober;
use crate::webhook::WebhookNotifier;

/// Per-cycle fan-out over the configured monitor set.
///
/// Each scheduled tick spawns one independent probe-retry-notify pipeline per
/// monitor and waits for all of them to settle. Pipelines share nothing but
/// the HTTP connection pool: one monitor sitting in its retry delays never
/// holds up another, and a webhook failure is logged and absorbed without
/// touching the rest of the cycle.
#[derive(Clone)]
pub struct Orchestrator {
    monitors: Arc<Vec<Monitor>>,
    policy: RetryPolicy,
    tick_interval: Duration,
    prober: Arc<dyn Prober>,
    notifier: WebhookNotifier,
    state: Arc<RwLock<RunnerState>>,
}

impl Orchestrator {
    pub fn new(
        monitors: Vec<Monitor>,
        config: &CheckConfig,
        prober: Arc<dyn Prober>,
        notifier: WebhookNotifier,
    ) -> Self {
        Self {
            monitors: Arc::new(monitors),
            policy: RetryPolicy::from_config(config),
            tick_interval: config.tick_interval,
            prober,
            notifier,
            state: Arc::new(RwLock::new(RunnerState::Idle)),
        }
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub async fn state(&self) -> RunnerState {
        *self.state.read().await
    }

    /// Run one full check cycle and wait for every pipeline to settle.
    ///
    /// Produces exactly one verdict and one webhook POST attempt per monitor.
    /// No pipeline outcome, including a panic, aborts the tick or the other
    /// pipelines.
    pub async fn run_cycle(&self) -> Vec<MonitorReport> {
        let handles: Vec<_> = self
            .monitors
            .iter()
            .cloned()
            .map(|monitor| {
                let policy = self.policy;
                let prober = Arc::clone(&self.prober);
                let notifier = self.notifier.clone();
                tokio::spawn(async move { check_monitor(monitor, policy, prober, notifier).await })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for settled in join_all(handles).await {
            match settled {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "Monitor pipeline task failed"),
            }
        }
        reports
    }

    /// Start the periodic check runner.
    ///
    /// Fires a cycle every `tick_interval` as a detached task, so a cycle
    /// whose retries outlast the interval overlaps the next tick instead of
    /// delaying it. Idempotent while active; a runner mid-shutdown must
    /// reach `Stopped` before it can be started again, otherwise the dying
    /// loop and a fresh one would tick concurrently.
    pub async fn start(&self) {
        {
            let mut state = self.state.write().await;
            match *state {
                RunnerState::Active | RunnerState::Stopping => return,
                RunnerState::Idle | RunnerState::Stopped => *state = RunnerState::Active,
            }
        }

        info!(
            monitor_count = self.monitors.len(),
            interval_secs = self.tick_interval.as_secs(),
            "Starting check runner"
        );

        let runner = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(runner.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                {
                    let current = *runner.state.read().await;
                    if current != RunnerState::Active {
                        *runner.state.write().await = RunnerState::Stopped;
                        info!("Check runner stopped");
                        break;
                    }
                }

                let cycle = runner.clone();
                tokio::spawn(async move {
                    let reports = cycle.run_cycle().await;
                    let down = reports.iter().filter(|r| !r.verdict.is_up()).count();
                    info!(
                        monitors = reports.len(),
                        down, "Check cycle settled"
                    );
                });
            }
        });
    }

    /// Request the runner to stop. In-flight cycles run to completion.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if *state == RunnerState::Active {
            *state = RunnerState::Stopping;
            info!("Stopping check runner");
        }
    }
}

async fn check_monitor(
    monitor: Monitor,
    policy: RetryPolicy,
    prober: Arc<dyn Prober>,
    notifier: WebhookNotifier,
) -> MonitorReport {
    let resolution = policy.resolve(prober.as_ref(), &monitor.url).await;

    match resolution.verdict {
        Verdict::Up => info!(
            monitor_id = %monitor.id,
            url = %monitor.url,
            attempts = resolution.attempts,
            "Monitor is up"
        ),
        Verdict::Down => warn!(
            monitor_id = %monitor.id,
            url = %monitor.url,
            attempts = resolution.attempts,
            status = ?resolution.last_status,
            "Monitor is down after retries"
        ),
    }

    let webhook_delivered = match notifier
        .notify(&monitor.webhook_url, resolution.verdict)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(
                monitor_id = %monitor.id,
                webhook_url = %monitor.webhook_url,
                error = %e,
                "Webhook delivery failed"
            );
            false
        }
    };

    MonitorReport {
        monitor_id: monitor.id,
        url: monitor.url,
        verdict: resolution.verdict,
        attempts: resolution.attempts,
        last_status: resolution.last_status,
        webhook_delivered,
        checked_at: Utc::now(),
    }
}
