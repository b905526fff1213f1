//! Binding and encoding error types.
//!
//! Three kinds of failure leave this crate:
//!
//! - [`FieldError`]: a user input problem tied to one field (missing,
//!   out of bounds, pattern mismatch, malformed text).
//! - [`DecodeError`]: a structured body that could not be decoded under the
//!   negotiated format. It cannot be attributed to a single field.
//! - [`EncodeError`]: a handler payload that could not be marshaled.
//!
//! [`BindError`] is what the binder returns and carries the status policy.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::negotiate::ContentFormat;

pub(crate) const MSG_REQUIRED: &str = "value is required";
pub(crate) const MSG_INVALID_MATCH: &str = "invalid match";

/// A validation failure tied to a single field.
///
/// Serializes as `{"name": ..., "message": ..., "value": ...}` so it can be
/// embedded verbatim in an error envelope.
///
/// # Example
///
/// ```rust
/// use valet_bind::FieldError;
///
/// let err = FieldError::above_maximum("age", "200", "130");
/// assert_eq!(err.name(), "age");
/// assert_eq!(err.value(), Some("200"));
/// assert_eq!(err.message(), "value is above maximum 130");
/// assert_eq!(err.to_string(), "field-error on 'age': value is above maximum 130");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("field-error on '{name}': {message}")]
pub struct FieldError {
    name: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl FieldError {
    /// Creates a field error with an explicit message.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            value: value.map(String::from),
        }
    }

    /// A required field had no value in its source and no default.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, None, MSG_REQUIRED)
    }

    /// The value (or its length) is below the declared minimum.
    #[must_use]
    pub fn below_minimum(name: impl Into<String>, value: &str, min: &str) -> Self {
        Self::new(name, Some(value), format!("value is below minimum {min}"))
    }

    /// The value (or its length) is above the declared maximum.
    #[must_use]
    pub fn above_maximum(name: impl Into<String>, value: &str, max: &str) -> Self {
        Self::new(name, Some(value), format!("value is above maximum {max}"))
    }

    /// The raw text did not match the declared pattern.
    #[must_use]
    pub fn invalid_match(name: impl Into<String>, value: &str) -> Self {
        Self::new(name, Some(value), MSG_INVALID_MATCH)
    }

    /// The field's type has no textual coercion.
    #[must_use]
    pub fn unsupported_type(name: impl Into<String>, value: &str, type_name: &str) -> Self {
        Self::new(
            name,
            Some(value),
            format!("unsupported field type {type_name}"),
        )
    }

    /// The raw text could not be converted to the field's type.
    #[must_use]
    pub fn invalid(name: impl Into<String>, value: &str, details: impl Into<String>) -> Self {
        Self::new(name, Some(value), details)
    }

    /// Returns the wire name of the field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the offending raw value, if one was seen.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A structured body could not be decoded under the negotiated format.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was malformed for the format.
    #[error("unable to parse {format}: {reason}")]
    Unmarshal {
        /// Format the body was decoded with.
        format: ContentFormat,
        /// Underlying parser message.
        reason: String,
    },

    /// A text-shaped body was not valid UTF-8.
    #[error("body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl DecodeError {
    pub(crate) fn unmarshal(format: ContentFormat, reason: impl ToString) -> Self {
        Self::Unmarshal {
            format,
            reason: reason.to_string(),
        }
    }
}

/// A payload could not be marshaled under the negotiated format.
#[derive(Debug, Error)]
#[error("unable to encode {format}: {reason}")]
pub struct EncodeError {
    format: ContentFormat,
    reason: String,
}

impl EncodeError {
    pub(crate) fn new(format: ContentFormat, reason: impl ToString) -> Self {
        Self {
            format,
            reason: reason.to_string(),
        }
    }

    /// Returns the format that failed.
    #[must_use]
    pub fn format(&self) -> ContentFormat {
        self.format
    }
}

/// Error returned when a target record cannot be bound.
///
/// The binder stops at the first failure; errors are never aggregated.
#[derive(Debug, Error)]
pub enum BindError {
    /// A single field failed validation or coercion.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The body could not be decoded into a structured field.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl BindError {
    /// Returns the field error, if this is one.
    #[must_use]
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            Self::Field(err) => Some(err),
            Self::Decode(_) => None,
        }
    }

    /// Returns the HTTP status this error should be answered with.
    ///
    /// Field errors are client errors; decode failures are reported as
    /// server errors since they cannot be attributed to one field.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Field(_) => StatusCode::BAD_REQUEST,
            Self::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Field(_) => "FIELD_ERROR",
            Self::Decode(_) => "DECODE_FAILED",
        }
    }
}
