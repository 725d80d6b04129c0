//! Shared data model for the vehicle property bridge.
//!
//! The types here travel between the host-facing gateway, the request
//! dispatchers, the property store and the agent bridge. They carry no
//! behaviour beyond construction helpers so every crate in the workspace can
//! depend on them without pulling in threads or transports.

mod clock;
mod config;
mod identity;
mod request;
mod value;

pub use clock::elapsed_realtime_nanos;
pub use config::{ChangeMode, ConfigDeclaration, PropertyAccess, PropertyConfig};
pub use identity::{GLOBAL_AREA, PropertyId, is_global_property};
pub use request::{
    GetValueRequest, GetValueResult, SetValueErrorEvent, SetValueRequest, SetValueResult,
    StatusCode,
};
pub use value::{PropertyStatus, PropertyValue, TaggedValue, ValueKind};
