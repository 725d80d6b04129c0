//! Shared fixtures and doubles for bridge tests.

mod recording;
mod scripted_transport;
mod world;

use std::time::Duration;

use vhal_config::BridgeTimings;
use vhal_types::{PropertyId, PropertyValue, TaggedValue};

pub use recording::{RecordingObserver, RecordingSink, Transition};
pub use scripted_transport::{ScriptHandle, ScriptedTransport};
pub use world::BridgeWorld;

/// HVAC fan speed, the property forwarded in every bridge test.
pub const FORWARDED_PROPERTY: i32 = 0x1540_0500;

/// Timings that never sleep.
#[must_use]
pub fn instant_timings() -> BridgeTimings {
    BridgeTimings {
        startup_delay: Duration::ZERO,
        discovery_timeout: Duration::ZERO,
        ping_timeout: Duration::ZERO,
        ping_attempts: 1,
        spin_budget: Duration::ZERO,
        retry_backoff: Duration::ZERO,
    }
}

/// Builds a value for `property` on the global area.
#[must_use]
pub fn int_value(property: i32, value: i32) -> PropertyValue {
    PropertyValue::new(PropertyId::global(property), 10, TaggedValue::Int32(value))
}

/// Panicking stand-in for the process-aborting fatal handler.
pub fn panic_on_fatal(error: &crate::TransportError) -> ! {
    panic!("entity creation failed: {error}")
}
