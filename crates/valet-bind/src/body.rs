//! Body handling.
//!
//! A body-sourced field is populated according to its shape. Bounds and
//! patterns are not applied to body values.
//!
//! | Shape | Result |
//! |-------|--------|
//! | Text | body as UTF-8 text |
//! | Bytes | body unchanged |
//! | TextLines | one entry per line, without a trailing empty line |
//! | Record | decoded under the inbound `Content-Type` |
//! | anything else | warning logged, field left unset |

use tracing::{debug, warn};

use crate::field::{Shape, Value};
use crate::plan::FieldBinding;
use crate::{negotiate, BindError, DecodeError, FieldError, RequestContext};

/// Populates a field of `target` from the raw body.
pub(crate) fn apply<T>(
    binding: &FieldBinding<T>,
    target: &mut T,
    raw: &[u8],
    ctx: &RequestContext,
) -> Result<(), BindError> {
    let value = match binding.shape() {
        Shape::Text => Value::Text(String::from_utf8(raw.to_vec()).map_err(DecodeError::from)?),
        Shape::Bytes => Value::Bytes(raw.to_vec()),
        Shape::TextLines => {
            let text = String::from_utf8(raw.to_vec()).map_err(DecodeError::from)?;
            Value::Lines(text.lines().map(String::from).collect())
        }
        Shape::Record => {
            let format = negotiate(ctx.content_type()).format;
            debug!(field = binding.field_name(), %format, "decoding body record");
            binding.decode(target, raw, format)?;
            return Ok(());
        }
        other => {
            warn!(
                field = binding.field_name(),
                shape = %other,
                type_name = binding.type_name(),
                "body cannot populate a field of this shape"
            );
            return Ok(());
        }
    };

    binding
        .assign(target, value)
        .map_err(|msg| FieldError::new(&binding.metadata().name, None, msg).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindPlan, Record};
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Pet {
        name: String,
    }

    #[derive(Debug, Default)]
    struct Target {
        text: String,
        raw: Vec<u8>,
        lines: Vec<String>,
        pet: Option<Record<Pet>>,
        count: u32,
    }

    fn plan() -> BindPlan<Target> {
        BindPlan::new()
            .field("text", "", |t: &mut Target| &mut t.text)
            .field("raw", "", |t: &mut Target| &mut t.raw)
            .field("lines", "", |t: &mut Target| &mut t.lines)
            .field("pet", "", |t: &mut Target| &mut t.pet)
            .field("count", "", |t: &mut Target| &mut t.count)
    }

    fn apply_field(index: usize, body: &'static str, content_type: &str) -> Result<Target, BindError> {
        let plan = plan();
        let ctx = RequestContext::builder()
            .header("content-type", content_type)
            .body(body)
            .build();
        let mut target = Target::default();
        apply(&plan.fields()[index], &mut target, body.as_bytes(), &ctx)?;
        Ok(target)
    }

    #[test]
    fn test_text_and_bytes_are_verbatim() {
        let t = apply_field(0, " hello\n", "").unwrap();
        assert_eq!(t.text, " hello\n");

        let t = apply_field(1, "\u{1}\u{2}", "").unwrap();
        assert_eq!(t.raw, vec![1, 2]);
    }

    #[test]
    fn test_lines_drop_trailing_newline() {
        let t = apply_field(2, "a\nb\r\nc\n", "").unwrap();
        assert_eq!(t.lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_record_uses_content_type() {
        let t = apply_field(3, r#"{"name":"Rex"}"#, "application/json").unwrap();
        assert_eq!(t.pet.unwrap().name, "Rex");

        let t = apply_field(3, "<Pet><name>Rex</name></Pet>", "application/xml").unwrap();
        assert_eq!(t.pet.unwrap().name, "Rex");
    }

    #[test]
    fn test_record_decode_failure_is_hard_error() {
        let err = apply_field(3, "{", "application/json").unwrap_err();
        assert!(matches!(err, BindError::Decode(_)));
    }

    #[test]
    fn test_record_under_plain_text_is_decode_error() {
        let err = apply_field(3, r#"{"name":"Rex"}"#, "text/plain").unwrap_err();
        assert!(matches!(err, BindError::Decode(_)));
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unsupported_shape_is_left_unset() {
        let t = apply_field(4, "42", "").unwrap();
        assert_eq!(t.count, 0);
    }

    #[test]
    fn test_invalid_utf8_text() {
        let plan = plan();
        let ctx = RequestContext::builder().build();
        let mut target = Target::default();

        let err = apply(&plan.fields()[0], &mut target, &[0xff, 0xfe], &ctx).unwrap_err();
        assert!(matches!(err, BindError::Decode(DecodeError::InvalidUtf8(_))));
    }
}
