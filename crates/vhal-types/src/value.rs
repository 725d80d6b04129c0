//! Property payloads and the values stored per identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::PropertyId;

/// Payload carried by a property value. Exactly one variant is populated and
/// the variant is fixed per property by its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaggedValue {
    /// Signed 64-bit integer.
    Int64(i64),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 8-bit integer.
    Uint8(u8),
    /// 32-bit float.
    Float(f32),
    /// UTF-8 string.
    String(String),
}

impl TaggedValue {
    /// Returns the kind of the populated variant.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Int64(_) => ValueKind::Int64,
            Self::Int32(_) => ValueKind::Int32,
            Self::Uint8(_) => ValueKind::Uint8,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
        }
    }
}

/// Discriminant of [`TaggedValue`], used by configurations to pin the
/// payload type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// [`TaggedValue::Int64`].
    Int64,
    /// [`TaggedValue::Int32`].
    Int32,
    /// [`TaggedValue::Uint8`].
    Uint8,
    /// [`TaggedValue::Float`].
    Float,
    /// [`TaggedValue::String`].
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Uint8 => "uint8",
            Self::Float => "float",
            Self::String => "string",
        };
        formatter.write_str(label)
    }
}

/// Availability of a stored property value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    /// The value is current.
    #[default]
    Available,
    /// The signal is not currently available on the bus.
    Unavailable,
    /// The signal reported an error.
    Error,
}

/// A timestamped property payload for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Monotonic timestamp in nanoseconds.
    pub timestamp: i64,
    /// Identity the payload belongs to.
    pub id: PropertyId,
    /// Availability reported alongside the payload.
    #[serde(default)]
    pub status: PropertyStatus,
    /// The payload itself.
    pub value: TaggedValue,
}

impl PropertyValue {
    /// Builds an available value.
    #[must_use]
    pub const fn new(id: PropertyId, timestamp: i64, value: TaggedValue) -> Self {
        Self {
            timestamp,
            id,
            status: PropertyStatus::Available,
            value,
        }
    }

    /// Returns the value with its timestamp replaced.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
