//! Content negotiation.
//!
//! The same rules pick the format of an inbound body (from `Content-Type`)
//! and of an outbound response (from `Accept`). The two directions are
//! resolved independently.
//!
//! | Media type | Format |
//! |------------|--------|
//! | `application/json` | [`ContentFormat::Json`] |
//! | `application/xml`, `text/xml` | [`ContentFormat::Xml`] |
//! | `text/plain` | [`ContentFormat::PlainText`] |
//! | anything else, or no header | [`ContentFormat::Json`], indentation 0 |
//!
//! An `indent` media parameter selects pretty printing, clamped to
//! `0..=MAX_INDENT`.

use std::fmt;

use mime::Mime;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::coerce::parse_integer;
use crate::DecodeError;

/// Largest indentation honoured.
pub const MAX_INDENT: usize = 10;

/// A wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentFormat {
    /// JSON.
    #[default]
    Json,
    /// XML.
    Xml,
    /// Plain text.
    PlainText,
}

impl ContentFormat {
    /// Maps a media type essence (`type/subtype`) to a format.
    #[must_use]
    pub fn from_essence(essence: &str) -> Option<Self> {
        match essence {
            "application/json" => Some(Self::Json),
            "application/xml" | "text/xml" => Some(Self::Xml),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Returns the canonical MIME string written in `Content-Type`.
    #[must_use]
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::Xml => "application/xml; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
        }
    }

    /// Returns the short format name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::PlainText => "text",
        }
    }

    /// Decodes a structured body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Unmarshal`] when the body is malformed, or when
    /// the format is plain text, which carries no structure.
    pub fn decode<T: DeserializeOwned>(&self, raw: &[u8]) -> Result<T, DecodeError> {
        match self {
            Self::Json => serde_json::from_slice(raw).map_err(|e| DecodeError::unmarshal(*self, e)),
            Self::Xml => {
                let text = std::str::from_utf8(raw).map_err(|e| DecodeError::unmarshal(*self, e))?;
                quick_xml::de::from_str(text).map_err(|e| DecodeError::unmarshal(*self, e))
            }
            Self::PlainText => Err(DecodeError::unmarshal(
                *self,
                "a plain text body cannot populate a record",
            )),
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The outcome of negotiation: a format and an indentation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaSelection {
    /// Selected format.
    pub format: ContentFormat,
    /// Indentation width, already clamped.
    pub indent: usize,
    /// Whether the header named a known format rather than falling back.
    pub explicit: bool,
}

impl MediaSelection {
    /// Creates a selection.
    #[must_use]
    pub fn new(format: ContentFormat, indent: usize) -> Self {
        Self {
            format,
            indent,
            explicit: true,
        }
    }

    /// Returns the `Content-Type` value to answer with.
    ///
    /// ```rust
    /// use valet_bind::{ContentFormat, MediaSelection};
    ///
    /// let sel = MediaSelection::new(ContentFormat::Json, 2);
    /// assert_eq!(sel.content_type(), "application/json; charset=utf-8; indent=2");
    /// ```
    #[must_use]
    pub fn content_type(&self) -> String {
        if self.indent > 0 {
            format!("{}; indent={}", self.format.mime(), self.indent)
        } else {
            self.format.mime().to_string()
        }
    }
}

/// Negotiates a format from a `Content-Type` or `Accept` header value.
///
/// # Example
///
/// ```rust
/// use valet_bind::{negotiate, ContentFormat};
///
/// let sel = negotiate(Some("application/xml; indent=4"));
/// assert_eq!(sel.format, ContentFormat::Xml);
/// assert_eq!(sel.indent, 4);
///
/// let sel = negotiate(Some("image/png; indent=4"));
/// assert_eq!(sel.format, ContentFormat::Json);
/// assert_eq!(sel.indent, 0);
/// ```
#[must_use]
pub fn negotiate(header: Option<&str>) -> MediaSelection {
    negotiate_with_limit(header, MAX_INDENT)
}

/// Like [`negotiate`] with a custom indentation ceiling. The ceiling itself
/// never exceeds [`MAX_INDENT`].
#[must_use]
pub fn negotiate_with_limit(header: Option<&str>, max_indent: usize) -> MediaSelection {
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return MediaSelection::default();
    };
    let max_indent = max_indent.min(MAX_INDENT);

    let mut candidates: Vec<(f32, Mime)> = header
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse::<Mime>() {
            Ok(media) => Some((quality(&media), media)),
            Err(e) => {
                warn!(media = part, error = %e, "unparsable media type");
                None
            }
        })
        .collect();

    // Stable, so equal weights keep header order.
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (q, media) in &candidates {
        if *q <= 0.0 {
            continue;
        }
        if let Some(format) = ContentFormat::from_essence(media.essence_str()) {
            let indent = media
                .get_param("indent")
                .map_or(0, |v| clamp_indent(v.as_str(), max_indent));
            debug!(%format, indent, "negotiated media type");
            return MediaSelection::new(format, indent);
        }
    }

    debug!(header, "no known media type, falling back to json");
    MediaSelection::default()
}

fn quality(media: &Mime) -> f32 {
    media
        .get_param("q")
        .and_then(|q| q.as_str().parse::<f32>().ok())
        .unwrap_or(1.0)
}

fn clamp_indent(text: &str, max_indent: usize) -> usize {
    match parse_integer(text) {
        Ok(n) if n <= 0 => 0,
        Ok(n) => usize::try_from(n).map_or(max_indent, |n| n.min(max_indent)),
        Err(_) => 0,
    }
}
