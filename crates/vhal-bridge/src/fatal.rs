//! Handling for unrecoverable entity-creation failures.

use tracing::error;

use crate::BRIDGE_TARGET;
use crate::errors::TransportError;

/// Handler invoked when the agent answered but its entity set could not be
/// built. The bridge cannot continue in a half-built state, so the handler
/// never returns.
pub type FatalHandler = fn(&TransportError) -> !;

/// Logs the failure and aborts the process.
pub fn abort_process(error: &TransportError) -> ! {
    error!(
        target: BRIDGE_TARGET,
        error = %error,
        "failed to create agent entities, aborting"
    );
    std::process::abort()
}
