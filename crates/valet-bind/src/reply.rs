//! Handler replies and response assembly.
//!
//! A [`Reply`] carries what a handler produced in named slots: an optional
//! status, an optional error and an optional body. [`ResponseEncoder`] turns
//! it into an [`http::Response`] following the negotiated format.
//!
//! # Status policy
//!
//! | Reply | Status |
//! |-------|--------|
//! | explicit status | that status |
//! | error, no status | 400 |
//! | empty body | 204 (200 when `no_content_on_empty` is off) |
//! | non-empty body | 200 |
//! | body failed to encode | 500, empty body |
//!
//! Errors are written as `{"error": ...}` where the value is either a
//! serialized [`FieldError`] or a message string.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::encode::{encode_with, Payload};
use crate::{negotiate_with_limit, BindError, FieldError, MAX_INDENT};

/// The error slot of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyError {
    /// A field validation failure, written as an object.
    Field(FieldError),
    /// Any other failure, written as its message.
    Message(String),
}

impl From<FieldError> for ReplyError {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl From<&BindError> for ReplyError {
    fn from(err: &BindError) -> Self {
        match err {
            BindError::Field(field) => Self::Field(field.clone()),
            BindError::Decode(decode) => Self::Message(decode.to_string()),
        }
    }
}

impl From<BindError> for ReplyError {
    fn from(err: BindError) -> Self {
        Self::from(&err)
    }
}

impl From<String> for ReplyError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ReplyError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// What a handler produced.
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use valet_bind::{Reply, ResponseEncoder};
///
/// let encoder = ResponseEncoder::default();
///
/// let created = encoder.respond(None, Reply::<()>::text("done").with_status(StatusCode::CREATED));
/// assert_eq!(created.status(), StatusCode::CREATED);
///
/// let empty = encoder.respond(None, Reply::<()>::empty());
/// assert_eq!(empty.status(), StatusCode::NO_CONTENT);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T = ()> {
    /// Status chosen by the handler.
    pub status: Option<StatusCode>,
    /// Error reported by the handler. Takes precedence over the body.
    pub error: Option<ReplyError>,
    /// Body produced by the handler.
    pub body: Option<Payload<T>>,
    /// `Content-Type` override, mostly for raw payloads.
    pub content_type: Option<String>,
}

impl<T> Default for Reply<T> {
    fn default() -> Self {
        Self {
            status: None,
            error: None,
            body: None,
            content_type: None,
        }
    }
}

impl<T> Reply<T> {
    /// A reply with no body.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A reply carrying a payload.
    #[must_use]
    pub fn payload(payload: Payload<T>) -> Self {
        Self {
            body: Some(payload),
            ..Self::default()
        }
    }

    /// A reply carrying a structured value.
    #[must_use]
    pub fn data(data: T) -> Self {
        Self::payload(Payload::Data(data))
    }

    /// A reply carrying a text value.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::payload(Payload::text(text))
    }

    /// A reply carrying text lines.
    #[must_use]
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::payload(Payload::lines(lines))
    }

    /// A reply carrying final bytes.
    #[must_use]
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self::payload(Payload::raw(bytes))
    }

    /// A reply reporting an error.
    #[must_use]
    pub fn error(err: impl Into<ReplyError>) -> Self {
        Self {
            error: Some(err.into()),
            ..Self::default()
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the `Content-Type` override.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Response encoding settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Answer an empty body with 204 when the handler chose no status.
    pub no_content_on_empty: bool,
    /// Indentation ceiling, at most [`MAX_INDENT`].
    pub max_indent: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            no_content_on_empty: true,
            max_indent: MAX_INDENT,
        }
    }
}

#[derive(Serialize)]
#[serde(rename = "response")]
struct ErrorEnvelope<'a> {
    error: &'a ReplyError,
}

/// Assembles HTTP responses from replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder {
    config: EncoderConfig,
}

impl ResponseEncoder {
    /// Creates an encoder.
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Builds the response for a reply, negotiating against `accept`.
    pub fn respond<T: Serialize>(&self, accept: Option<&str>, reply: Reply<T>) -> Response<Bytes> {
        if let Some(err) = &reply.error {
            let status = reply.status.unwrap_or(StatusCode::BAD_REQUEST);
            return self.respond_error(accept, status, err);
        }

        self.write(accept, reply.status, reply.body.as_ref(), reply.content_type.as_deref())
    }

    /// Builds the error response for a failed bind.
    pub fn respond_bind_error(&self, accept: Option<&str>, err: &BindError) -> Response<Bytes> {
        self.respond_error(accept, err.status_code(), &ReplyError::from(err))
    }

    /// Builds an error envelope response with the given status.
    pub fn respond_error(
        &self,
        accept: Option<&str>,
        status: StatusCode,
        err: &ReplyError,
    ) -> Response<Bytes> {
        let envelope = Payload::Data(ErrorEnvelope { error: err });
        self.write(accept, Some(status), Some(&envelope), None)
    }

    fn write<T: Serialize>(
        &self,
        accept: Option<&str>,
        status: Option<StatusCode>,
        payload: Option<&Payload<T>>,
        content_type: Option<&str>,
    ) -> Response<Bytes> {
        let selection = negotiate_with_limit(accept, self.config.max_indent);

        let (body, negotiated_type) = match payload.map(|p| encode_with(selection, p)) {
            None => (Bytes::new(), None),
            Some(Ok(encoded)) => (encoded.body, Some(encoded.content_type)),
            Some(Err(e)) => {
                error!(error = %e, "failed to encode response body");
                return build(StatusCode::INTERNAL_SERVER_ERROR, Bytes::new(), None);
            }
        };

        let status = status.unwrap_or_else(|| {
            if body.is_empty() && self.config.no_content_on_empty {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::OK
            }
        });

        let content_type = if body.is_empty() {
            None
        } else {
            content_type.map(String::from).or(negotiated_type)
        };

        debug!(
            status = status.as_u16(),
            len = body.len(),
            format = %selection.format,
            indent = selection.indent,
            "response encoded"
        );
        build(status, body, content_type.as_deref())
    }
}

fn build(status: StatusCode, body: Bytes, content_type: Option<&str>) -> Response<Bytes> {
    let len = body.len();
    let mut response = Response::new(body);
    *response.status_mut() = status;

    if let Some(ct) = content_type {
        match HeaderValue::from_str(ct) {
            Ok(value) => {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            Err(_) => warn!(content_type = ct, "dropping invalid content type"),
        }
    }
    if len > 0 {
        response.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
    }

    response
}
