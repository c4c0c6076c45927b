pub mod cycle;
pub mod retry;
pub mod state;

pub use cycle::Orchestrator;
pub use retry::{Resolution, RetryPolicy};
pub use state::{Monitor, MonitorReport, RunnerState, Verdict};
