//! Wire representation of set requests sent to the agent.

use serde::Serialize;
use vhal_types::{PropertyId, PropertyValue, TaggedValue};

/// A set request as the agent expects it.
///
/// The agent carries one sequence per payload type; exactly one of them holds
/// a single element for any request built by [`SetPropertyRequest::from_value`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetPropertyRequest {
    /// Timestamp of the value in monotonic nanoseconds.
    pub timestamp: i64,
    /// Area the value applies to.
    pub area_id: i32,
    /// Vehicle property identifier.
    pub prop_id: i32,
    /// 64-bit integer payload.
    pub int64_values: Vec<i64>,
    /// 32-bit integer payload.
    pub int32_values: Vec<i32>,
    /// Unsigned byte payload.
    pub uint8_values: Vec<u8>,
    /// Float payload.
    pub float_values: Vec<f32>,
    /// String payload.
    pub string_values: Vec<String>,
}

impl SetPropertyRequest {
    /// Builds the wire request for `value`.
    #[must_use]
    pub fn from_value(value: &PropertyValue) -> Self {
        let mut request = Self {
            timestamp: value.timestamp,
            area_id: value.id.area,
            prop_id: value.id.property,
            ..Self::default()
        };
        match &value.value {
            TaggedValue::Int64(payload) => request.int64_values.push(*payload),
            TaggedValue::Int32(payload) => request.int32_values.push(*payload),
            TaggedValue::Uint8(payload) => request.uint8_values.push(*payload),
            TaggedValue::Float(payload) => request.float_values.push(*payload),
            TaggedValue::String(payload) => request.string_values.push(payload.clone()),
        }
        request
    }

    /// Identity addressed by the request.
    #[must_use]
    pub const fn id(&self) -> PropertyId {
        PropertyId::new(self.prop_id, self.area_id)
    }

    /// First populated payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<TaggedValue> {
        self.int64_values
            .first()
            .map(|payload| TaggedValue::Int64(*payload))
            .or_else(|| self.int32_values.first().map(|payload| TaggedValue::Int32(*payload)))
            .or_else(|| self.uint8_values.first().map(|payload| TaggedValue::Uint8(*payload)))
            .or_else(|| self.float_values.first().map(|payload| TaggedValue::Float(*payload)))
            .or_else(|| {
                self.string_values
                    .first()
                    .map(|payload| TaggedValue::String(payload.clone()))
            })
    }

    /// Rebuilds the property value carried by the request.
    #[must_use]
    pub fn to_value(&self) -> Option<PropertyValue> {
        self.payload()
            .map(|payload| PropertyValue::new(self.id(), self.timestamp, payload))
    }
}
