//! Structured health reporting for service lifecycle events.

use std::sync::Arc;

use vhal_bridge::ConnectionObserver;
use vhal_config::Config;

use crate::bootstrap::BootstrapError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the bridge thread is running and requests are served.
    fn service_started(&self, config: &Config);

    /// Invoked when the bridge connects to the agent.
    fn agent_connected(&self);

    /// Invoked when the bridge loses the agent.
    fn agent_disconnected(&self);

    /// Invoked once a shutdown signal has been received.
    fn shutdown_starting(&self);

    /// Invoked after every component has stopped.
    fn shutdown_completed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn service_started(&self, config: &Config) {
        (**self).service_started(config);
    }

    fn agent_connected(&self) {
        (**self).agent_connected();
    }

    fn agent_disconnected(&self) {
        (**self).agent_disconnected();
    }

    fn shutdown_starting(&self) {
        (**self).shutdown_starting();
    }

    fn shutdown_completed(&self) {
        (**self).shutdown_completed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "vhald::health",
            event = "bootstrap_starting",
            "starting service bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        let timings = config.bridge_timings();
        tracing::info!(
            target: "vhald::health",
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            ping_timeout_ms = config.ping_timeout_ms,
            ping_attempts = timings.ping_attempts,
            "service bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "vhald::health",
            event = "bootstrap_failed",
            error = %error,
            "service bootstrap failed"
        );
    }

    fn service_started(&self, config: &Config) {
        tracing::info!(
            target: "vhald::health",
            event = "service_started",
            startup_delay_ms = config.startup_delay_ms,
            "vehicle property service running"
        );
    }

    fn agent_connected(&self) {
        tracing::info!(
            target: "vhald::health",
            event = "agent_connected",
            state = "connected",
            "agent bridge connected"
        );
    }

    fn agent_disconnected(&self) {
        tracing::warn!(
            target: "vhald::health",
            event = "agent_disconnected",
            state = "disconnected",
            "agent bridge disconnected"
        );
    }

    fn shutdown_starting(&self) {
        tracing::info!(
            target: "vhald::health",
            event = "shutdown_starting",
            "draining requests before shutdown"
        );
    }

    fn shutdown_completed(&self) {
        tracing::info!(
            target: "vhald::health",
            event = "shutdown_completed",
            "service stopped"
        );
    }
}

/// Relays bridge connection transitions to a [`HealthReporter`].
pub struct HealthConnectionObserver {
    reporter: Arc<dyn HealthReporter>,
}

impl HealthConnectionObserver {
    /// Wraps `reporter`.
    #[must_use]
    pub fn new(reporter: Arc<dyn HealthReporter>) -> Self {
        Self { reporter }
    }
}

impl ConnectionObserver for HealthConnectionObserver {
    fn connected(&self) {
        self.reporter.agent_connected();
    }

    fn disconnected(&self) {
        self.reporter.agent_disconnected();
    }
}
