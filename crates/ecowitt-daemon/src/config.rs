//! Daemon runtime overrides from environment variables

use anyhow::{Context, Result};
use ecowitt_config::{Settings, DEFAULT_CONFIG_PATH};
use ecowitt_obs::LogFormat;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Settings file (ECOWITT_CONFIG, default: ecowitt.toml)
    pub config_path: PathBuf,

    /// Poll period override in milliseconds (ECOWITT_POLL_MS)
    pub poll_interval: Option<Duration>,

    /// Fetch timeout override in seconds (ECOWITT_FETCH_TIMEOUT_SECS)
    pub fetch_timeout: Option<Duration>,

    /// HTTP bind override (ECOWITT_HTTP_BIND)
    pub http_bind: Option<String>,

    /// ECOWITT_LOG_FORMAT=json for JSON logs
    pub log_format: LogFormat,

    /// Replay a saved payload instead of polling a gateway (ECOWITT_FIXTURE)
    pub fixture: Option<PathBuf>,
}

impl DaemonConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = lookup("ECOWITT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let poll_interval = lookup("ECOWITT_POLL_MS")
            .map(|v| v.parse::<u64>().context("Invalid ECOWITT_POLL_MS"))
            .transpose()?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let fetch_timeout = lookup("ECOWITT_FETCH_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>().context("Invalid ECOWITT_FETCH_TIMEOUT_SECS"))
            .transpose()?
            .filter(|s| *s > 0)
            .map(Duration::from_secs);

        let http_bind = lookup("ECOWITT_HTTP_BIND").filter(|v| !v.trim().is_empty());

        let log_format = lookup("ECOWITT_LOG_FORMAT")
            .map(|v| LogFormat::from_name(&v))
            .unwrap_or_default();

        let fixture = lookup("ECOWITT_FIXTURE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            config_path,
            poll_interval,
            fetch_timeout,
            http_bind,
            log_format,
            fixture,
        })
    }

    pub fn poll_interval(&self, settings: &Settings) -> Duration {
        self.poll_interval
            .unwrap_or_else(|| settings.poll_interval())
    }

    pub fn fetch_timeout(&self, settings: &Settings) -> Duration {
        self.fetch_timeout
            .unwrap_or_else(|| settings.fetch_timeout())
    }

    pub fn http_bind(&self, settings: &Settings) -> String {
        self.http_bind
            .clone()
            .unwrap_or_else(|| settings.http_bind())
    }
}
