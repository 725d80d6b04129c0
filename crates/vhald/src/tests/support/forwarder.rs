//! Mock [`SetForwarder`] standing in for the agent bridge.

use mockall::mock;
use vhal_bridge::{SendRejection, SequenceNumber, SetForwarder, TransportError};
use vhal_types::PropertyValue;

use crate::declarations::FORWARDED_PROPERTIES;

mock! {
    pub Forwarder {}
    impl SetForwarder for Forwarder {
        fn forwards(&self, property: i32) -> bool;
        fn is_connected(&self) -> bool;
        fn try_send_set_request(
            &self,
            value: &PropertyValue,
        ) -> Result<SequenceNumber, SendRejection>;
    }
}

/// Agent behaviour simulated by [`forwarder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderMode {
    /// The bridge is disconnected; nothing may be sent.
    Offline,
    /// The bridge is connected and every send succeeds.
    Connected,
    /// The bridge is connected but the transport rejects every send.
    Rejecting,
}

/// Builds a forwarder serving the built-in forwarded properties.
pub fn forwarder(mode: ForwarderMode) -> MockForwarder {
    let mut mock = MockForwarder::new();
    mock.expect_forwards()
        .returning(|property| FORWARDED_PROPERTIES.contains(&property));
    mock.expect_is_connected()
        .return_const(mode != ForwarderMode::Offline);
    match mode {
        ForwarderMode::Offline => {
            mock.expect_try_send_set_request().never();
        }
        ForwarderMode::Connected => {
            mock.expect_try_send_set_request().returning(|_| Ok(1));
        }
        ForwarderMode::Rejecting => {
            mock.expect_try_send_set_request().returning(|_| {
                Err(SendRejection::Transport(TransportError::Rejected {
                    message: String::from("agent refused the write"),
                }))
            });
        }
    }
    mock
}
