//! Shared doubles and worlds for the service test suites.

mod batches;
mod config_loader;
mod forwarder;
mod gateway_world;
mod process_world;
mod reporter;

pub use batches::BatchLog;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use forwarder::{ForwarderMode, MockForwarder, forwarder};
pub use gateway_world::GatewayWorld;
pub use process_world::{ProcessWorld, TestShutdownSignal};
pub use reporter::{HealthEvent, RecordingHealthReporter};

use vhal_types::{PropertyId, PropertyValue, SetValueRequest, TaggedValue};

/// Builds a set request for an `Int32` property.
pub fn int_set_request(request_id: i64, id: PropertyId, value: i32) -> SetValueRequest {
    SetValueRequest {
        request_id,
        value: PropertyValue::new(id, 0, TaggedValue::Int32(value)),
    }
}

/// Parses a hexadecimal (`0x`-prefixed) or decimal step argument.
pub fn parse_int(raw: &str) -> i64 {
    let parsed = match raw.strip_prefix("0x") {
        Some(digits) => i64::from_str_radix(digits, 16),
        None => raw.parse(),
    };
    match parsed {
        Ok(value) => value,
        Err(error) => panic!("invalid integer '{raw}': {error}"),
    }
}
