//! Applies agent traffic to the property store.

use std::sync::Arc;

use tracing::{debug, trace};
use vhal_bridge::{InboundMessage, InboundSink};

use crate::store::PropertyStore;

const INBOUND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::inbound");

/// [`InboundSink`] writing agent property updates into the store.
///
/// Updates carry the agent's own status, so writes replace the stored status.
/// Stale or unknown updates are dropped with a debug log.
pub struct StoreInboundSink {
    store: Arc<dyn PropertyStore>,
}

impl StoreInboundSink {
    /// Builds a sink writing into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }
}

impl InboundSink for StoreInboundSink {
    fn deliver(&self, message: InboundMessage) {
        match message {
            InboundMessage::PropertyUpdate(value) => {
                let id = value.id;
                if let Err(error) = self.store.write_value(value, true) {
                    debug!(
                        target: INBOUND_TARGET,
                        property = id.property,
                        area = id.area,
                        %error,
                        "agent update dropped"
                    );
                }
            }
            InboundMessage::SetAcknowledged { sequence, accepted } => {
                trace!(target: INBOUND_TARGET, sequence, accepted, "set acknowledgement");
            }
        }
    }
}
