mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{fmt, EnvFilter};

use pulse_core::{CheckConfig, HttpProber, Orchestrator, RetryPolicy, Verdict, WebhookNotifier};

/// Endpoint uptime monitor — periodic liveness checks with webhook alerts.
#[derive(Parser)]
#[command(name = "pulse-monitor", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic check scheduler until interrupted.
    Run {
        /// Path to TOML config file. Without it, monitors come from
        /// NUMBER_OF_MONITORS / URL{n} / WEBHOOK_URL{n} env variables.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Check interval in seconds. Overrides config.
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Probe a single endpoint once and exit 0 (up) or 1 (down).
    Check {
        /// Endpoint URL to probe.
        url: String,

        /// Optional webhook URL to notify with the verdict.
        #[arg(long)]
        webhook_url: Option<String>,

        /// Additional attempts after a failed first probe.
        #[arg(long, default_value_t = 5)]
        retries: u32,

        /// Delay between attempts in seconds.
        #[arg(long, default_value_t = 5)]
        retry_delay: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, interval } => {
            run_scheduler(config, interval).await;
        }
        Commands::Check {
            url,
            webhook_url,
            retries,
            retry_delay,
        } => {
            fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .init();
            run_check(url, webhook_url, retries, retry_delay).await;
        }
    }
}

async fn run_scheduler(config_path: Option<PathBuf>, interval_override: Option<u64>) {
    let loaded = match config_path {
        Some(ref path) => config::AppConfig::load(path),
        None => config::AppConfig::from_env(),
    };

    let app_config = match loaded {
        Ok(c) => c,
        Err(e) => {
            init_tracing("pretty");
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&app_config.defaults.log_format);
    if let Some(ref path) = config_path {
        tracing::info!(path = %path.display(), "Loaded config file");
    } else {
        tracing::info!("Loaded monitor configuration from environment");
    }

    let mut check_config = app_config.defaults.to_check_config();
    if let Some(secs) = interval_override {
        check_config = check_config.with_tick_interval(secs);
    }

    let monitors = app_config.to_monitors();
    tracing::info!(
        monitor_count = monitors.len(),
        interval_secs = check_config.tick_interval.as_secs(),
        "Starting uptime monitor"
    );

    let client = HttpProber::build_client(check_config.request_timeout);
    let prober = Arc::new(HttpProber::with_client(client.clone()));
    let notifier = WebhookNotifier::new(client, check_config.webhook_timeout);

    let orchestrator = Orchestrator::new(monitors, &check_config, prober, notifier);
    orchestrator.start().await;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping check runner");
    orchestrator.stop().await;
}

async fn run_check(url: String, webhook_url: Option<String>, retries: u32, retry_delay: u64) {
    let config = CheckConfig::default()
        .with_max_retries(retries)
        .with_retry_delay(Duration::from_secs(retry_delay));
    let policy = RetryPolicy::from_config(&config);
    let prober = HttpProber::from_config(&config);

    println!(
        "{} {}",
        style("checking").dim(),
        style(&url).bold()
    );

    let resolution = policy.resolve(&prober, &url).await;

    let verdict_label = match resolution.verdict {
        Verdict::Up => style("UP").green().bold(),
        Verdict::Down => style("DOWN").red().bold(),
    };
    let status_label = match resolution.last_status {
        Some(code) => format!("HTTP {}", code),
        None => "no response".to_string(),
    };
    println!(
        "{}  {} after {} attempt{}",
        verdict_label,
        style(status_label).dim(),
        resolution.attempts,
        if resolution.attempts == 1 { "" } else { "s" }
    );

    if let Some(ref hook) = webhook_url {
        let notifier = WebhookNotifier::from_config(&config);
        match notifier.notify(hook, resolution.verdict).await {
            Ok(()) => println!("{} {}", style("webhook delivered to").dim(), hook),
            Err(e) => eprintln!("{} {}", style("webhook failed:").red(), e),
        }
    }

    std::process::exit(if resolution.verdict.is_up() { 0 } else { 1 });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        "json" => {
            fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt().with_env_filter(filter).init();
        }
    }
}
