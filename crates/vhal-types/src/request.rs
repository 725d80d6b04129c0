//! Requests accepted from the host and the results delivered back.

use serde::{Deserialize, Serialize};

use crate::identity::PropertyId;
use crate::value::PropertyValue;

/// Outcome reported per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// The request was resolved.
    Ok,
    /// The request could not be resolved.
    InternalError,
}

impl StatusCode {
    /// Whether the status signals success.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Request to read the current value of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValueRequest {
    /// Caller-assigned identifier echoed in the result.
    pub request_id: i64,
    /// Identity to read.
    pub id: PropertyId,
}

/// Request to write a property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValueRequest {
    /// Caller-assigned identifier echoed in the result.
    pub request_id: i64,
    /// Value to write. Its timestamp is replaced when the write is applied.
    pub value: PropertyValue,
}

/// Result of a [`GetValueRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueResult {
    /// Identifier of the originating request.
    pub request_id: i64,
    /// Resolution status.
    pub status: StatusCode,
    /// The value read, present only when `status` is [`StatusCode::Ok`].
    pub value: Option<PropertyValue>,
}

impl GetValueResult {
    /// Builds a successful result.
    #[must_use]
    pub const fn ok(request_id: i64, value: PropertyValue) -> Self {
        Self {
            request_id,
            status: StatusCode::Ok,
            value: Some(value),
        }
    }

    /// Builds a failed result.
    #[must_use]
    pub const fn failed(request_id: i64) -> Self {
        Self {
            request_id,
            status: StatusCode::InternalError,
            value: None,
        }
    }
}

/// Result of a [`SetValueRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueResult {
    /// Identifier of the originating request.
    pub request_id: i64,
    /// Resolution status.
    pub status: StatusCode,
}

/// Reported to the host when a forwarded write fails after it was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueErrorEvent {
    /// Identity whose write failed.
    pub id: PropertyId,
    /// Failure status.
    pub error: StatusCode,
}
