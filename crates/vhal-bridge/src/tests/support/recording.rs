//! Recording hooks used to observe the bridge from tests.

use std::sync::Mutex;

use crate::{ConnectionObserver, InboundMessage, InboundSink};

/// Connection transition observed by [`RecordingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `connected` was called.
    Connected,
    /// `disconnected` was called.
    Disconnected,
}

/// Observer that records every transition in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    transitions: Mutex<Vec<Transition>>,
}

impl RecordingObserver {
    /// Returns the recorded transitions.
    pub fn transitions(&self) -> Vec<Transition> {
        self.transitions
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    fn record(&self, transition: Transition) {
        self.transitions
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(transition);
    }
}

impl ConnectionObserver for RecordingObserver {
    fn connected(&self) {
        self.record(Transition::Connected);
    }

    fn disconnected(&self) {
        self.record(Transition::Disconnected);
    }
}

/// Sink that stores every inbound message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<InboundMessage>>,
}

impl RecordingSink {
    /// Returns the delivered messages.
    pub fn messages(&self) -> Vec<InboundMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl InboundSink for RecordingSink {
    fn deliver(&self, message: InboundMessage) {
        self.messages
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(message);
    }
}
