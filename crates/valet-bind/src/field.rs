//! Field shapes and the [`BindField`] trait.
//!
//! A field's Rust type decides its [`Shape`], which in turn selects the
//! coercer (for path, query and header values) or the body handling rule.
//! Coercers produce a [`Value`] that the field type converts into itself.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;

use crate::{ContentFormat, DecodeError};

/// Semantic type of a bindable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Signed or unsigned integer.
    Integer,
    /// Floating point number.
    Float,
    /// Boolean.
    Boolean,
    /// UTF-8 text.
    Text,
    /// Byte buffer (base64 on the wire, raw from the body).
    Bytes,
    /// Elapsed time.
    Duration,
    /// Point in time.
    Timestamp,
    /// Sequence of text lines (body only).
    TextLines,
    /// Structured record decoded from the body.
    Record,
    /// No coercion exists for this type.
    Unsupported,
}

/// A coerced value, ready to be stored in a field slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value, wide enough for every primitive integer type.
    Integer(i128),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Text value.
    Text(String),
    /// Byte buffer.
    Bytes(Vec<u8>),
    /// Elapsed time.
    Duration(Duration),
    /// Point in time.
    Timestamp(DateTime<FixedOffset>),
    /// Ordered text lines.
    Lines(Vec<String>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Duration(_) => "duration",
            Self::Timestamp(_) => "timestamp",
            Self::Lines(_) => "lines",
        }
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected} value, got {}", value.kind())
}

/// A type that can occupy a slot in a target record.
///
/// Implementations exist for the primitive integer and float types, `bool`,
/// `String`, `Vec<u8>`, [`Bytes`], [`Duration`], chrono timestamps,
/// `Vec<String>` (text lines), [`Record<T>`] and `Option<F>` of any of them.
///
/// A type without a textual coercion can still be declared with
/// [`Shape::Unsupported`]; binding it from a path, query or header value then
/// fails with a field error naming the type.
pub trait BindField: Sized + 'static {
    /// The semantic shape of this type.
    const SHAPE: Shape;

    /// Type name used in error messages.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Converts a coerced value into this type.
    ///
    /// # Errors
    ///
    /// Returns a message when the value does not fit this type.
    fn from_value(value: Value) -> Result<Self, String>;

    /// Decodes a structured body into this type. Only called for
    /// [`Shape::Record`].
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the body is malformed.
    fn decode_record(_raw: &[u8], format: ContentFormat) -> Result<Self, DecodeError> {
        Err(DecodeError::unmarshal(
            format,
            format!("{} is not a structured record", Self::type_name()),
        ))
    }
}

macro_rules! impl_integer_field {
    ($($t:ty),* $(,)?) => {
        $(
            impl BindField for $t {
                const SHAPE: Shape = Shape::Integer;

                fn type_name() -> &'static str {
                    stringify!($t)
                }

                fn from_value(value: Value) -> Result<Self, String> {
                    match value {
                        Value::Integer(v) => <$t>::try_from(v)
                            .map_err(|_| format!("value {v} is out of range for {}", stringify!($t))),
                        other => Err(mismatch("integer", &other)),
                    }
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl BindField for f64 {
    const SHAPE: Shape = Shape::Float;

    fn type_name() -> &'static str {
        "f64"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl BindField for f32 {
    const SHAPE: Shape = Shape::Float;

    fn type_name() -> &'static str {
        "f32"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(v as f32),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl BindField for bool {
    const SHAPE: Shape = Shape::Boolean;

    fn type_name() -> &'static str {
        "bool"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Boolean(v) => Ok(v),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl BindField for String {
    const SHAPE: Shape = Shape::Text;

    fn type_name() -> &'static str {
        "String"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl BindField for Vec<u8> {
    const SHAPE: Shape = Shape::Bytes;

    fn type_name() -> &'static str {
        "Vec<u8>"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl BindField for Bytes {
    const SHAPE: Shape = Shape::Bytes;

    fn type_name() -> &'static str {
        "Bytes"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bytes(v) => Ok(Bytes::from(v)),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl BindField for Duration {
    const SHAPE: Shape = Shape::Duration;

    fn type_name() -> &'static str {
        "Duration"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Duration(v) => Ok(v),
            other => Err(mismatch("duration", &other)),
        }
    }
}

impl BindField for DateTime<FixedOffset> {
    const SHAPE: Shape = Shape::Timestamp;

    fn type_name() -> &'static str {
        "DateTime<FixedOffset>"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl BindField for DateTime<Utc> {
    const SHAPE: Shape = Shape::Timestamp;

    fn type_name() -> &'static str {
        "DateTime<Utc>"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(v) => Ok(v.with_timezone(&Utc)),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl BindField for Vec<String> {
    const SHAPE: Shape = Shape::TextLines;

    fn type_name() -> &'static str {
        "Vec<String>"
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Lines(v) => Ok(v),
            other => Err(mismatch("lines", &other)),
        }
    }
}

impl<F: BindField> BindField for Option<F> {
    const SHAPE: Shape = F::SHAPE;

    fn type_name() -> &'static str {
        F::type_name()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        F::from_value(value).map(Some)
    }

    fn decode_record(raw: &[u8], format: ContentFormat) -> Result<Self, DecodeError> {
        F::decode_record(raw, format).map(Some)
    }
}

/// A structured record decoded from the request body.
///
/// The body is decoded according to the request's `Content-Type`
/// (JSON unless XML is declared).
///
/// # Example
///
/// ```rust
/// use valet_bind::{BindField, ContentFormat, Record};
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize, PartialEq)]
/// struct Pet {
///     name: String,
/// }
///
/// let pet = Record::<Pet>::decode_record(br#"{"name":"Rex"}"#, ContentFormat::Json).unwrap();
/// assert_eq!(pet.name, "Rex");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record<T>(pub T);

impl<T> Record<T> {
    /// Consumes the wrapper and returns the record.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Record<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: DeserializeOwned + 'static> BindField for Record<T> {
    const SHAPE: Shape = Shape::Record;

    fn from_value(value: Value) -> Result<Self, String> {
        Err(format!(
            "{} is only populated from the body, got {}",
            Self::type_name(),
            value.kind()
        ))
    }

    fn decode_record(raw: &[u8], format: ContentFormat) -> Result<Self, DecodeError> {
        format.decode(raw).map(Record)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Duration => "duration",
            Self::Timestamp => "timestamp",
            Self::TextLines => "lines",
            Self::Record => "record",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_is_checked_per_type() {
        assert_eq!(u8::from_value(Value::Integer(255)), Ok(255));
        assert!(u8::from_value(Value::Integer(256)).is_err());
        assert!(u32::from_value(Value::Integer(-1)).is_err());
        assert_eq!(i64::from_value(Value::Integer(-42)), Ok(-42));
    }

    #[test]
    fn test_mismatched_value() {
        let err = bool::from_value(Value::Text("yes".into())).unwrap_err();
        assert_eq!(err, "expected boolean value, got text");
    }

    #[test]
    fn test_option_delegates() {
        assert_eq!(<Option<u16> as BindField>::SHAPE, Shape::Integer);
        assert_eq!(<Option<u16>>::type_name(), "u16");
        assert_eq!(Option::<u16>::from_value(Value::Integer(7)), Ok(Some(7)));
    }

    #[test]
    fn test_utc_timestamp_conversion() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T12:00:00+02:00").unwrap();
        let utc = DateTime::<Utc>::from_value(Value::Timestamp(ts)).unwrap();

        assert_eq!(utc.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_record_rejects_textual_values() {
        #[derive(Debug, serde::Deserialize)]
        struct Pet {
            #[allow(dead_code)]
            name: String,
        }

        assert_eq!(<Record<Pet> as BindField>::SHAPE, Shape::Record);
        assert!(Record::<Pet>::from_value(Value::Text("x".into())).is_err());
    }

    #[test]
    fn test_non_record_decode_fails() {
        let err = String::decode_record(b"x", ContentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("not a structured record"));
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Shape::TextLines.to_string(), "lines");
        assert_eq!(Shape::Record.to_string(), "record");
    }
}
