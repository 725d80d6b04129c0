//! Bridge between the property gateway and a remote signal-bus agent.
//!
//! The crate owns the connection to the agent: a background thread discovers
//! and pings the agent, creates the communication entities once it answers and
//! tears them down again when it stops answering. Set requests from the
//! gateway are translated into wire requests and forwarded only while the
//! entities exist. Everything that talks to the real agent sits behind the
//! [`AgentTransport`] and [`EntitySet`] traits so tests and the daemon's
//! [`LoopbackTransport`] can stand in for the signal bus.

#![deny(missing_docs)]

mod bridge;
mod errors;
mod fatal;
mod hooks;
mod loopback;
mod state;
mod transport;
mod wire;

pub use bridge::AgentBridge;
pub use errors::{BridgeError, SendRejection, TransportError};
pub use fatal::{FatalHandler, abort_process};
pub use hooks::{
    ConnectionObserver, DiscardInbound, InboundSink, NoopConnectionObserver, SetForwarder,
};
pub use loopback::{LoopbackHandle, LoopbackTransport};
pub use state::ConnectionState;
pub use transport::{
    AgentTransport, DiscoveryOutcome, EntitySet, InboundMessage, SequenceNumber,
};
pub use vhal_config::BridgeTimings;
pub use wire::SetPropertyRequest;

/// Log target for bridge lifecycle events.
pub(crate) const BRIDGE_TARGET: &str = "vhal_bridge::bridge";

#[cfg(test)]
mod tests;
