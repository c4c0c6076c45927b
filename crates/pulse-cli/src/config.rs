//! Configuration loading: TOML file schema and environment variable scheme.
//!
//! Example config file:
//!
//! ```toml
//! [defaults]
//! interval_secs = 60
//! max_retries = 5
//! retry_delay_secs = 5
//! log_format = "json"
//!
//! [[monitor]]
//! id = "api"
//! url = "https://api.example.com/health"
//! webhook_url = "https://hooks.example.com/uptime"
//!
//! [[monitor]]
//! url = "https://www.example.com/"
//! webhook_url = "https://hooks.example.com/uptime"
//! ```
//!
//! Without a config file, monitors come from the environment:
//! `NUMBER_OF_MONITORS` plus `URL{n}` / `WEBHOOK_URL{n}` pairs, `n` counted
//! from 0. A `.env` file in the working directory is honored.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use pulse_core::{CheckConfig, Monitor};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub monitor: Vec<MonitorDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            webhook_timeout_secs: default_webhook_timeout_secs(),
            log_format: default_log_format(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_webhook_timeout_secs() -> u64 {
    5
}

fn default_log_format() -> String {
    "pretty".into()
}

impl DefaultsConfig {
    pub fn to_check_config(&self) -> CheckConfig {
        CheckConfig::default()
            .with_tick_interval(self.interval_secs)
            .with_request_timeout(self.request_timeout_secs)
            .with_max_retries(self.max_retries)
            .with_retry_delay(Duration::from_secs(self.retry_delay_secs))
            .with_webhook_timeout(self.webhook_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorDef {
    pub id: Option<String>,
    pub url: String,
    pub webhook_url: String,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build from an injected variable lookup, so tests never touch the
    /// process environment.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let raw = lookup("NUMBER_OF_MONITORS")
            .ok_or_else(|| "NUMBER_OF_MONITORS is not set".to_string())?;
        let count: usize = raw
            .trim()
            .parse()
            .map_err(|_| format!("Invalid NUMBER_OF_MONITORS: {}", raw))?;

        let mut monitors = Vec::with_capacity(count);
        for i in 0..count {
            let url = lookup(&format!("URL{}", i)).ok_or_else(|| format!("URL{} is not set", i))?;
            let webhook_url = lookup(&format!("WEBHOOK_URL{}", i))
                .ok_or_else(|| format!("WEBHOOK_URL{} is not set", i))?;
            monitors.push(MonitorDef {
                id: None,
                url,
                webhook_url,
            });
        }

        let config = Self {
            defaults: DefaultsConfig::default(),
            monitor: monitors,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_monitors(&self) -> Vec<Monitor> {
        self.monitor
            .iter()
            .enumerate()
            .map(|(i, m)| {
                Monitor::new(
                    m.id.clone().unwrap_or_else(|| format!("monitor_{}", i)),
                    m.url.clone(),
                    m.webhook_url.clone(),
                )
            })
            .collect()
    }

    fn validate(&self) -> Result<(), String> {
        if self.monitor.is_empty() {
            return Err("No monitors configured".into());
        }

        let mut ids = HashSet::new();
        for (i, m) in self.monitor.iter().enumerate() {
            if let Some(ref id) = m.id {
                if id.is_empty() {
                    return Err(format!("Monitor ID at index {} must not be empty", i));
                }
                if !ids.insert(id) {
                    return Err(format!("Duplicate monitor ID: {}", id));
                }
            }
            check_url(&m.url, "monitor URL", i)?;
            check_url(&m.webhook_url, "webhook URL", i)?;
        }

        match self.defaults.log_format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "Invalid log_format '{}': must be 'pretty' or 'json'",
                    other
                ));
            }
        }

        Ok(())
    }
}

fn check_url(raw: &str, what: &str, index: usize) -> Result<(), String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| format!("Invalid {} at index {}: {} ({})", what, index, raw, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!(
            "{} at index {} must use http or https: {}",
            what, index, raw
        ));
    }
    Ok(())
}
