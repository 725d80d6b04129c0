//! Connection state machine run on the bridge thread.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use vhal_config::BridgeTimings;

use super::BridgeShared;
use crate::BRIDGE_TARGET;
use crate::fatal::{FatalHandler, abort_process};
use crate::hooks::{ConnectionObserver, DiscardInbound, InboundSink, NoopConnectionObserver};
use crate::state::ConnectionState;
use crate::transport::{AgentTransport, DiscoveryOutcome, InboundMessage};

/// Longest uninterrupted sleep; pauses re-check the shutdown flag this often.
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Drives the Disconnected/Connected state machine.
pub(crate) struct ConnectionLoop {
    shared: Arc<BridgeShared>,
    transport: Box<dyn AgentTransport>,
    timings: BridgeTimings,
    pub(super) inbound: Arc<dyn InboundSink>,
    pub(super) observer: Arc<dyn ConnectionObserver>,
    pub(super) fatal: FatalHandler,
}

impl ConnectionLoop {
    pub(super) fn new(
        shared: Arc<BridgeShared>,
        transport: Box<dyn AgentTransport>,
        timings: BridgeTimings,
    ) -> Self {
        Self {
            shared,
            transport,
            timings,
            inbound: Arc::new(DiscardInbound),
            observer: Arc::new(NoopConnectionObserver),
            fatal: abort_process,
        }
    }

    /// Thread body: waits out the startup delay, steps until shutdown and
    /// releases any live entity set on the way out.
    pub(super) fn run(mut self) {
        debug!(target: BRIDGE_TARGET, "agent bridge thread running");
        if self.pause(self.timings.startup_delay) {
            while !self.shared.shutdown_requested() {
                self.step();
            }
        }
        self.disconnect();
        debug!(target: BRIDGE_TARGET, "agent bridge thread stopped");
    }

    /// Runs one iteration of the state machine and returns the state it left
    /// the bridge in.
    pub(crate) fn step(&mut self) -> ConnectionState {
        match self.shared.state() {
            ConnectionState::Disconnected => self.connect(),
            ConnectionState::Connected => self.service(),
        }
        self.shared.state()
    }

    fn connect(&mut self) {
        match self.transport.discover(self.timings.discovery_timeout) {
            DiscoveryOutcome::Found => {
                debug!(target: BRIDGE_TARGET, "agent discovered");
            }
            DiscoveryOutcome::Timeout => {
                debug!(target: BRIDGE_TARGET, "agent discovery timed out");
                self.back_off();
                return;
            }
            DiscoveryOutcome::Error(message) => {
                debug!(target: BRIDGE_TARGET, error = %message, "agent discovery failed");
                self.back_off();
                return;
            }
        }

        if let Err(error) = self
            .transport
            .ping(self.timings.ping_timeout, self.timings.ping_attempts)
        {
            debug!(target: BRIDGE_TARGET, error = %error, "agent not answering");
            self.back_off();
            return;
        }

        {
            let mut entities = self.shared.lock_entities();
            match self.transport.create_entities() {
                Ok(entity_set) => {
                    *entities = Some(entity_set);
                    self.shared.state.store(ConnectionState::Connected);
                }
                Err(error) => (self.fatal)(&error),
            }
        }

        info!(
            target: BRIDGE_TARGET,
            state = %ConnectionState::Connected,
            "agent connected"
        );
        self.observer.connected();
    }

    fn service(&mut self) {
        if let Err(error) = self
            .transport
            .ping(self.timings.ping_timeout, self.timings.ping_attempts)
        {
            debug!(target: BRIDGE_TARGET, error = %error, "agent lost");
            self.disconnect();
            return;
        }

        let mut inbound: Vec<InboundMessage> = Vec::new();
        {
            let mut entities = self.shared.lock_entities();
            if let Some(entity_set) = entities.as_mut() {
                let mut collect = |message: InboundMessage| inbound.push(message);
                if let Err(error) = entity_set.spin_some(self.timings.spin_budget, &mut collect) {
                    warn!(
                        target: BRIDGE_TARGET,
                        error = %error,
                        "failed to service agent traffic"
                    );
                }
            }
        }

        if inbound.is_empty() {
            // Idle outside the lock so senders are not held up.
            self.pause(self.timings.spin_budget);
            return;
        }
        for message in inbound {
            self.deliver(message);
        }
    }

    fn deliver(&self, message: InboundMessage) {
        if let InboundMessage::SetAcknowledged { sequence, accepted } = &message {
            debug!(
                target: BRIDGE_TARGET,
                sequence,
                accepted,
                "agent acknowledged set request"
            );
        }
        self.inbound.deliver(message);
    }

    /// Destroys the entity set, if any, and publishes `Disconnected`.
    pub(crate) fn disconnect(&mut self) {
        {
            let mut entities = self.shared.lock_entities();
            let Some(entity_set) = entities.take() else {
                return;
            };
            if let Err(error) = entity_set.destroy() {
                warn!(
                    target: BRIDGE_TARGET,
                    error = %error,
                    "failed to release agent entities"
                );
            }
            self.shared.state.store(ConnectionState::Disconnected);
        }

        info!(
            target: BRIDGE_TARGET,
            state = %ConnectionState::Disconnected,
            "agent disconnected"
        );
        self.observer.disconnected();
    }

    fn back_off(&self) {
        self.pause(self.timings.retry_backoff);
    }

    /// Sleeps for `duration`, returning `false` early if shutdown is
    /// requested.
    fn pause(&self, duration: Duration) -> bool {
        let started = Instant::now();
        loop {
            if self.shared.shutdown_requested() {
                return false;
            }
            let Some(remaining) = duration
                .checked_sub(started.elapsed())
                .filter(|remaining| !remaining.is_zero())
            else {
                return true;
            };
            thread::sleep(remaining.min(SHUTDOWN_POLL));
        }
    }
}
