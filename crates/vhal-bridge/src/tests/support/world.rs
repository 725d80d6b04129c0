//! BDD world wrapping a bridge whose connection loop is stepped by hand.

use std::sync::Arc;

use crate::bridge::ConnectionLoop;
use crate::{AgentBridge, SendRejection, SequenceNumber};

use super::recording::RecordingObserver;
use super::scripted_transport::{ScriptHandle, ScriptedTransport};
use super::{FORWARDED_PROPERTY, instant_timings, int_value, panic_on_fatal};

/// Shared state exercised by the bridge step definitions.
pub struct BridgeWorld {
    /// Bridge under test.
    pub bridge: AgentBridge,
    connection: ConnectionLoop,
    /// Steering handle for the scripted agent.
    pub script: ScriptHandle,
    /// Recorded connection transitions.
    pub observer: Arc<RecordingObserver>,
    /// Outcome of the last send attempt.
    pub last_send: Option<Result<SequenceNumber, SendRejection>>,
}

impl BridgeWorld {
    /// Builds a world around `transport`.
    ///
    /// # Panics
    ///
    /// Panics if the connection loop was already detached.
    pub fn new(transport: ScriptedTransport) -> Self {
        let script = transport.handle();
        let observer = Arc::new(RecordingObserver::default());
        let bridge = AgentBridge::new(transport, [FORWARDED_PROPERTY], instant_timings())
            .with_observer(observer.clone())
            .with_fatal_handler(panic_on_fatal);
        let Some(connection) = bridge.detach_connection() else {
            panic!("fresh bridge must expose its connection loop");
        };
        Self {
            bridge,
            connection,
            script,
            observer,
            last_send: None,
        }
    }

    /// Runs `times` iterations, checking the entity invariant after each.
    pub fn step(&mut self, times: usize) {
        for _ in 0..times {
            self.connection.step();
            assert_eq!(
                self.bridge.has_entities(),
                self.bridge.is_connected(),
                "entity set must exist exactly while connected"
            );
        }
    }

    /// Sends an Int32 value for `property`.
    pub fn send(&mut self, property: i32) {
        self.last_send = Some(self.bridge.try_send_set_request(&int_value(property, 5)));
    }

    /// Releases any live entity set.
    pub fn shut_down(&mut self) {
        self.connection.disconnect();
    }
}
