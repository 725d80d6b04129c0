//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use vhal_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ServiceStarted,
    AgentConnected,
    AgentDisconnected,
    ShutdownStarting,
    ShutdownCompleted,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
    recorded: Condvar,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
        self.recorded.notify_all();
    }

    /// Blocks until `event` has been recorded or `limit` elapses.
    pub fn wait_for(&self, event: &HealthEvent, limit: Duration) -> bool {
        let guard = self.events.lock().expect("health reporter mutex poisoned");
        let (guard, _) = self
            .recorded
            .wait_timeout_while(guard, limit, |events| !events.contains(event))
            .expect("health reporter mutex poisoned during wait");
        guard.contains(event)
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn service_started(&self, _config: &Config) {
        self.record(HealthEvent::ServiceStarted);
    }

    fn agent_connected(&self) {
        self.record(HealthEvent::AgentConnected);
    }

    fn agent_disconnected(&self) {
        self.record(HealthEvent::AgentDisconnected);
    }

    fn shutdown_starting(&self) {
        self.record(HealthEvent::ShutdownStarting);
    }

    fn shutdown_completed(&self) {
        self.record(HealthEvent::ShutdownCompleted);
    }
}
