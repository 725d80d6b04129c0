//! Layered configuration for the vehicle property bridge daemon.
//!
//! Values resolve from built-in defaults, an optional TOML file
//! (`--config-path` or `VHAL_CONFIG_PATH`), `VHAL_*` environment variables and
//! finally CLI flags, each layer overriding the previous one.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DISCOVERY_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_PING_ATTEMPTS,
    DEFAULT_PING_TIMEOUT_MS, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_SPIN_BUDGET_MS,
    DEFAULT_STARTUP_DELAY_MS, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "VHAL")]
pub struct Config {
    /// `tracing` filter expression.
    #[ortho_config(default = DEFAULT_LOG_FILTER.to_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = LogFormat::Json)]
    pub log_format: LogFormat,
    /// Delay before the first agent discovery attempt, in milliseconds.
    #[ortho_config(default = 0)]
    pub startup_delay_ms: u64,
    /// Budget for one discovery attempt, in milliseconds.
    #[ortho_config(default = 1000)]
    pub discovery_timeout_ms: u64,
    /// Budget for one ping attempt, in milliseconds.
    #[ortho_config(default = 250)]
    pub ping_timeout_ms: u64,
    /// Ping attempts per liveness check.
    #[ortho_config(default = 5)]
    pub ping_attempts: u32,
    /// Inbound drain budget per loop iteration, in milliseconds.
    #[ortho_config(default = 100)]
    pub spin_budget_ms: u64,
    /// Pause between failed connection attempts, in milliseconds.
    #[ortho_config(default = 100)]
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            discovery_timeout_ms: DEFAULT_DISCOVERY_TIMEOUT_MS,
            ping_timeout_ms: DEFAULT_PING_TIMEOUT_MS,
            ping_attempts: DEFAULT_PING_ATTEMPTS,
            spin_budget_ms: DEFAULT_SPIN_BUDGET_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

/// Bridge timing parameters expressed as durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTimings {
    /// Delay before the first discovery attempt.
    pub startup_delay: Duration,
    /// Budget for one discovery attempt.
    pub discovery_timeout: Duration,
    /// Budget for one ping attempt.
    pub ping_timeout: Duration,
    /// Ping attempts per liveness check.
    pub ping_attempts: u32,
    /// Inbound drain budget per loop iteration.
    pub spin_budget: Duration,
    /// Pause between failed connection attempts.
    pub retry_backoff: Duration,
}

impl Default for BridgeTimings {
    fn default() -> Self {
        Config::default().bridge_timings()
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Converts the millisecond settings into bridge timings.
    #[must_use]
    pub fn bridge_timings(&self) -> BridgeTimings {
        BridgeTimings {
            startup_delay: Duration::from_millis(self.startup_delay_ms),
            discovery_timeout: Duration::from_millis(self.discovery_timeout_ms),
            ping_timeout: Duration::from_millis(self.ping_timeout_ms),
            ping_attempts: self.ping_attempts.max(1),
            spin_budget: Duration::from_millis(self.spin_budget_ms),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}
