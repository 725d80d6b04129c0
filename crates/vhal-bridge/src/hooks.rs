//! Seams through which the bridge talks to the rest of the daemon.

use std::sync::Arc;

use tracing::trace;
use vhal_types::PropertyValue;

use crate::BRIDGE_TARGET;
use crate::errors::SendRejection;
use crate::transport::{InboundMessage, SequenceNumber};

/// Receives traffic from the agent.
///
/// The bridge calls the sink from its own thread after releasing the entity
/// lock, so implementations may call back into the bridge.
pub trait InboundSink: Send + Sync {
    /// Handles one inbound message.
    fn deliver(&self, message: InboundMessage);
}

impl<T> InboundSink for Arc<T>
where
    T: InboundSink + ?Sized,
{
    fn deliver(&self, message: InboundMessage) {
        self.as_ref().deliver(message);
    }
}

/// Sink that drops inbound traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardInbound;

impl InboundSink for DiscardInbound {
    fn deliver(&self, message: InboundMessage) {
        trace!(target: BRIDGE_TARGET, ?message, "discarding inbound message");
    }
}

/// Observes connection transitions.
pub trait ConnectionObserver: Send + Sync {
    /// The entity set was created and the bridge is connected.
    fn connected(&self);

    /// The entity set was destroyed and the bridge is disconnected.
    fn disconnected(&self);
}

impl<T> ConnectionObserver for Arc<T>
where
    T: ConnectionObserver + ?Sized,
{
    fn connected(&self) {
        self.as_ref().connected();
    }

    fn disconnected(&self) {
        self.as_ref().disconnected();
    }
}

/// Observer that ignores every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopConnectionObserver;

impl ConnectionObserver for NoopConnectionObserver {
    fn connected(&self) {}

    fn disconnected(&self) {}
}

/// Forwards locally applied set requests to the agent.
pub trait SetForwarder: Send + Sync {
    /// Whether values of `property` are forwarded at all.
    fn forwards(&self, property: i32) -> bool;

    /// Advisory snapshot of the connection state.
    fn is_connected(&self) -> bool;

    /// Transmits `value` to the agent.
    ///
    /// # Errors
    ///
    /// Returns the reason the request was not transmitted.
    fn try_send_set_request(&self, value: &PropertyValue) -> Result<SequenceNumber, SendRejection>;

    /// Transmits `value`, reporting only whether it left the process.
    fn send_set_request(&self, value: &PropertyValue) -> bool {
        self.try_send_set_request(value).is_ok()
    }
}
