//! Built-in defaults applied before files, environment and CLI layers.

use crate::logging::LogFormat;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Delay before the bridge makes its first discovery attempt.
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 0;

/// Budget for one agent discovery attempt.
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 1_000;

/// Budget for a single agent ping attempt.
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 250;

/// Ping attempts made per liveness check before the agent is declared lost.
pub const DEFAULT_PING_ATTEMPTS: u32 = 5;

/// Time budget for draining inbound agent traffic per loop iteration.
pub const DEFAULT_SPIN_BUDGET_MS: u64 = 100;

/// Pause between failed connection attempts.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

/// Default log filter expression used by the daemon.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
