//! Error types raised by the agent bridge and its transports.

use std::io;

use thiserror::Error;

/// Errors reported by an [`AgentTransport`](crate::AgentTransport) or an
/// [`EntitySet`](crate::EntitySet).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The agent did not answer any ping attempt.
    #[error("agent did not answer after {attempts} ping attempts")]
    PingExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The link to the agent dropped.
    #[error("agent link is down")]
    LinkDown,

    /// One of the communication entities could not be created.
    #[error("failed to create {entity}: {message}")]
    EntityCreation {
        /// Entity that failed, for example `node` or `client`.
        entity: String,
        /// Description of the failure.
        message: String,
    },

    /// The agent refused a request.
    #[error("agent rejected request: {message}")]
    Rejected {
        /// Description supplied by the agent or transport.
        message: String,
    },

    /// Releasing an entity failed.
    #[error("failed to release {entity}: {message}")]
    Teardown {
        /// Entity that failed to release.
        entity: String,
        /// Description of the failure.
        message: String,
    },

    /// I/O error on the underlying link.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while starting or stopping the bridge thread.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge was started twice or restarted after stopping.
    #[error("agent bridge has already been started")]
    AlreadyStarted,

    /// The operating system refused to spawn the bridge thread.
    #[error("failed to spawn agent bridge thread")]
    Spawn {
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },

    /// The bridge thread panicked.
    #[error("agent bridge thread panicked")]
    ThreadPanic,
}

/// Reasons a set request was not forwarded to the agent.
#[derive(Debug, Error)]
pub enum SendRejection {
    /// The property is served locally only.
    #[error("property {property:#x} is not forwarded to the agent")]
    NotForwarded {
        /// Rejected property identifier.
        property: i32,
    },

    /// No entity set exists because the agent is not connected.
    #[error("agent bridge is disconnected")]
    Disconnected,

    /// The entity set refused to transmit the request.
    #[error("transport refused set request")]
    Transport(#[source] TransportError),
}
