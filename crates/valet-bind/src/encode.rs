//! Payload encoding.
//!
//! Marshals handler output under the negotiated format. Raw bytes bypass
//! marshaling entirely and are labelled `application/octet-stream` unless
//! the reply names its own type. Plain text only carries text and text
//! lines; any other payload under plain text encodes to an empty body.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::{negotiate, ContentFormat, EncodeError, MediaSelection};

/// Root element name for bare text values in XML.
const XML_TEXT_ROOT: &str = "string";

/// Handler output.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T = ()> {
    /// Final bytes, written unchanged.
    Raw(Bytes),
    /// A single text value.
    Text(String),
    /// Text lines, newline-joined under plain text.
    Lines(Vec<String>),
    /// A structured value.
    Data(T),
}

impl<T> Payload<T> {
    /// Wraps final bytes.
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self::Raw(bytes.into())
    }

    /// Wraps a text value.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Wraps text lines.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lines(lines.into_iter().map(Into::into).collect())
    }
}

/// An encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Encoded bytes.
    pub body: Bytes,
    /// `Content-Type` to answer with; `application/octet-stream` for raw
    /// payloads.
    pub content_type: String,
    /// The negotiated format.
    pub selection: MediaSelection,
}

/// Encodes `payload` for the given `Accept` header value.
///
/// # Errors
///
/// Returns [`EncodeError`] when the payload cannot be marshaled.
///
/// # Example
///
/// ```rust
/// use valet_bind::{encode, Payload};
/// use serde_json::json;
///
/// let out = encode(Some("application/json; indent=2"), &Payload::Data(json!({"sum": 3}))).unwrap();
/// assert_eq!(&out.body[..], b"{\n  \"sum\": 3\n}");
/// assert_eq!(out.content_type, "application/json; charset=utf-8; indent=2");
/// ```
pub fn encode<T: Serialize>(accept: Option<&str>, payload: &Payload<T>) -> Result<Encoded, EncodeError> {
    encode_with(negotiate(accept), payload)
}

/// Encodes `payload` under an already negotiated selection.
///
/// # Errors
///
/// Returns [`EncodeError`] when the payload cannot be marshaled.
pub fn encode_with<T: Serialize>(
    selection: MediaSelection,
    payload: &Payload<T>,
) -> Result<Encoded, EncodeError> {
    if let Payload::Raw(bytes) = payload {
        debug!(len = bytes.len(), "raw payload passed through");
        return Ok(Encoded {
            body: bytes.clone(),
            content_type: mime::APPLICATION_OCTET_STREAM.to_string(),
            selection,
        });
    }

    let body = match selection.format {
        ContentFormat::Json => to_json(payload, selection.indent)?,
        ContentFormat::Xml => to_xml(payload, selection.indent)?,
        ContentFormat::PlainText => to_text(payload),
    };

    Ok(Encoded {
        body: Bytes::from(body),
        content_type: selection.content_type(),
        selection,
    })
}

fn to_json<T: Serialize>(payload: &Payload<T>, indent: usize) -> Result<Vec<u8>, EncodeError> {
    match payload {
        Payload::Raw(bytes) => Ok(bytes.to_vec()),
        Payload::Text(text) => json_value(text, indent),
        Payload::Lines(lines) => json_value(lines, indent),
        Payload::Data(data) => json_value(data, indent),
    }
}

fn json_value<V: Serialize + ?Sized>(value: &V, indent: usize) -> Result<Vec<u8>, EncodeError> {
    let fail = |e: serde_json::Error| EncodeError::new(ContentFormat::Json, e);

    if indent == 0 {
        return serde_json::to_vec(value).map_err(fail);
    }

    let spaces = b" ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&spaces);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(fail)?;
    Ok(buf)
}

fn to_xml<T: Serialize>(payload: &Payload<T>, indent: usize) -> Result<Vec<u8>, EncodeError> {
    let out = match payload {
        Payload::Raw(bytes) => return Ok(bytes.to_vec()),
        Payload::Text(text) => xml_value(text, Some(XML_TEXT_ROOT), indent),
        Payload::Lines(lines) => xml_value(lines, Some(XML_TEXT_ROOT), indent),
        Payload::Data(data) => xml_value(data, None, indent),
    };
    out.map(String::into_bytes)
}

fn xml_value<V: Serialize + ?Sized>(
    value: &V,
    root: Option<&str>,
    indent: usize,
) -> Result<String, EncodeError> {
    let fail = |e: quick_xml::se::SeError| EncodeError::new(ContentFormat::Xml, e);

    let mut out = String::new();
    let mut ser = match root {
        Some(root) => quick_xml::se::Serializer::with_root(&mut out, Some(root)).map_err(fail)?,
        None => quick_xml::se::Serializer::new(&mut out),
    };
    if indent > 0 {
        ser.indent(' ', indent);
    }
    value.serialize(ser).map_err(fail)?;
    Ok(out)
}

fn to_text<T>(payload: &Payload<T>) -> Vec<u8> {
    match payload {
        Payload::Raw(bytes) => bytes.to_vec(),
        Payload::Text(text) => text.clone().into_bytes(),
        Payload::Lines(lines) => lines.join("\n").into_bytes(),
        Payload::Data(_) => Vec::new(),
    }
}
