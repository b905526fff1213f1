//! Value coercers.
//!
//! One routine per shape converts raw text into a [`Value`] and applies the
//! field's declared bounds. Bounds are skipped when the text came from the
//! field's declared default. Bound checks are inclusive at both ends.
//!
//! | Shape | Accepted text | Bounds compare |
//! |-------|---------------|----------------|
//! | Integer | `42`, `-7`, `0x2a`, `052`, `0b101010`, `0o52` | value |
//! | Float | `1.5`, `-2e10` | value |
//! | Boolean | `1 t T TRUE true True 0 f F FALSE false False` | - |
//! | Text | anything | byte length |
//! | Bytes | standard base64 | decoded length |
//! | Duration | `10s`, `2h30m`, `1.5h`, `300ms` | magnitude |
//! | Timestamp | see [`parse_timestamp`] | chronological order |

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::field::{Shape, Value};
use crate::{FieldError, FieldMetadata};

pub use crate::duration::parse_duration;
pub use crate::timestamp::parse_timestamp;

/// Coerces `text` into a value of the given shape.
///
/// `type_name` is only used for the unsupported-type error. When
/// `is_default` is set the declared bounds are not enforced.
///
/// # Errors
///
/// Returns a [`FieldError`] when the text is malformed for the shape, when a
/// bound is violated, or when the shape has no textual coercion.
pub fn coerce(
    metadata: &FieldMetadata,
    shape: Shape,
    type_name: &str,
    text: &str,
    is_default: bool,
) -> Result<Value, FieldError> {
    let bounds = Bounds {
        metadata,
        text,
        enforce: !is_default,
    };

    match shape {
        Shape::Integer => {
            let v = parse_integer(text).map_err(|e| bounds.invalid(e))?;
            bounds.check(&v, parse_integer)?;
            Ok(Value::Integer(v))
        }
        Shape::Float => {
            let v = parse_float(text).map_err(|e| bounds.invalid(e))?;
            bounds.check(&v, parse_float)?;
            Ok(Value::Float(v))
        }
        Shape::Boolean => parse_bool(text)
            .map(Value::Boolean)
            .map_err(|e| bounds.invalid(e)),
        Shape::Text => {
            bounds.check(&(text.len() as i128), parse_integer)?;
            Ok(Value::Text(text.to_string()))
        }
        Shape::Bytes => {
            let buf = STANDARD
                .decode(text)
                .map_err(|e| bounds.invalid(format!("invalid base64: {e}")))?;
            bounds.check(&(buf.len() as i128), parse_integer)?;
            Ok(Value::Bytes(buf))
        }
        Shape::Duration => {
            let v = parse_duration(text).map_err(|e| bounds.invalid(e))?;
            bounds.check(&v, parse_duration)?;
            Ok(Value::Duration(v))
        }
        Shape::Timestamp => {
            let v = parse_timestamp(text).map_err(|e| bounds.invalid(e))?;
            bounds.check(&v, parse_timestamp)?;
            Ok(Value::Timestamp(v))
        }
        Shape::TextLines | Shape::Record | Shape::Unsupported => Err(
            FieldError::unsupported_type(&metadata.name, text, type_name),
        ),
    }
}

struct Bounds<'a> {
    metadata: &'a FieldMetadata,
    text: &'a str,
    enforce: bool,
}

impl Bounds<'_> {
    fn invalid(&self, details: impl Into<String>) -> FieldError {
        FieldError::invalid(&self.metadata.name, self.text, details)
    }

    fn check<V, P>(&self, value: &V, parse: P) -> Result<(), FieldError>
    where
        V: PartialOrd,
        P: Fn(&str) -> Result<V, String>,
    {
        if !self.enforce {
            return Ok(());
        }

        if let Some(min) = &self.metadata.min {
            let bound = parse(min).map_err(|e| self.invalid(format!("invalid minimum: {e}")))?;
            if *value < bound {
                return Err(FieldError::below_minimum(&self.metadata.name, self.text, min));
            }
        }

        if let Some(max) = &self.metadata.max {
            let bound = parse(max).map_err(|e| self.invalid(format!("invalid maximum: {e}")))?;
            if *value > bound {
                return Err(FieldError::above_maximum(&self.metadata.name, self.text, max));
            }
        }

        Ok(())
    }
}

/// Parses an integer, inferring the base from its prefix.
///
/// `0x`/`0X` is hexadecimal, `0o`/`0O` or a bare leading `0` is octal,
/// `0b`/`0B` is binary; anything else is decimal. Underscores may follow the
/// base prefix or separate digits, but only when a base prefix is present.
///
/// # Errors
///
/// Returns a message when the text is not an integer.
///
/// # Example
///
/// ```rust
/// use valet_bind::coerce::parse_integer;
///
/// assert_eq!(parse_integer("42"), Ok(42));
/// assert_eq!(parse_integer("-0x1F"), Ok(-31));
/// assert_eq!(parse_integer("017"), Ok(15));
/// assert_eq!(parse_integer("0b1_0"), Ok(2));
/// assert!(parse_integer("1_000").is_err());
/// ```
pub fn parse_integer(text: &str) -> Result<i128, String> {
    let invalid = || format!("invalid integer {text:?}");

    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits, prefixed) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest, true)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..], true)
    } else {
        (10, lower.as_str(), false)
    };

    if digits.contains('_') && !prefixed {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty()
        || !cleaned.chars().all(|c| c.is_ascii_alphanumeric())
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }

    let magnitude = i128::from_str_radix(&cleaned, radix).map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses a decimal or exponential floating point number.
///
/// # Errors
///
/// Returns a message when the text is not a number.
pub fn parse_float(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("invalid float {text:?}"))
}

/// Parses the canonical boolean spellings.
///
/// # Errors
///
/// Returns a message for anything else.
pub fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {text:?}")),
    }
}
