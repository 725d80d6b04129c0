//! Interface to the remote agent consumed by the bridge.

use std::time::Duration;

use vhal_types::PropertyValue;

use crate::errors::TransportError;
use crate::wire::SetPropertyRequest;

/// Sequence number the agent assigns to a transmitted request.
pub type SequenceNumber = i64;

/// Result of a single discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// An agent answered the discovery probe.
    Found,
    /// No agent answered within the timeout.
    Timeout,
    /// Discovery failed outright.
    Error(String),
}

/// Traffic received from the agent while servicing the entity set.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// The agent published a new value for a property.
    PropertyUpdate(PropertyValue),
    /// The agent answered a previously sent set request.
    SetAcknowledged {
        /// Sequence number returned when the request was sent.
        sequence: SequenceNumber,
        /// Whether the agent applied the request.
        accepted: bool,
    },
}

/// Connection-level operations against the agent.
///
/// The bridge thread owns the transport exclusively and calls it only from
/// the connection loop.
pub trait AgentTransport: Send {
    /// Probes for an agent, waiting at most `timeout`.
    fn discover(&mut self, timeout: Duration) -> DiscoveryOutcome;

    /// Checks agent liveness, trying up to `attempts` times with `timeout`
    /// each.
    ///
    /// # Errors
    ///
    /// Returns an error when no attempt succeeds.
    fn ping(&mut self, timeout: Duration, attempts: u32) -> Result<(), TransportError>;

    /// Builds every entity needed to talk to the agent.
    ///
    /// Creation is all-or-nothing: on error no partial entity set survives.
    ///
    /// # Errors
    ///
    /// Returns an error when any entity cannot be created.
    fn create_entities(&mut self) -> Result<Box<dyn EntitySet>, TransportError>;
}

/// Live communication entities bound to a connected agent.
pub trait EntitySet: Send {
    /// Transmits a set request without waiting for the agent's answer.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be handed to the link.
    fn send(&mut self, request: &SetPropertyRequest) -> Result<SequenceNumber, TransportError>;

    /// Services inbound traffic for at most `budget`, passing each message to
    /// `deliver`.
    ///
    /// # Errors
    ///
    /// Returns an error when the link fails while servicing.
    fn spin_some(
        &mut self,
        budget: Duration,
        deliver: &mut dyn FnMut(InboundMessage),
    ) -> Result<(), TransportError>;

    /// Releases every entity.
    ///
    /// # Errors
    ///
    /// Returns an error when an entity fails to release; the set is consumed
    /// regardless.
    fn destroy(self: Box<Self>) -> Result<(), TransportError>;
}
