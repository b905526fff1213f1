//! Field metadata parsing.
//!
//! Every field of a target record carries a declarative annotation in
//! struct-tag style:
//!
//! ```text
//! name:"age" from:"query" required min:"0" max:"130" default:"18" pattern:"^\d+$"
//! ```
//!
//! Keys are separated by whitespace. A value is a double-quoted string in
//! which `\"` and `\\` are the only escapes. A bare key (`required`) is
//! present with an empty value. The first occurrence of a key wins.
//! Malformed input stops parsing; whatever was read up to that point is kept.
//!
//! `min`, `max`, `default` and `pattern` are carried as raw text and only
//! interpreted by the coercer for the field's concrete type.

use std::fmt;

use crate::coerce::parse_bool;

/// Where a field's value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Captured path variable.
    #[default]
    Path,
    /// Query string parameter.
    Query,
    /// Request header.
    Header,
    /// The whole request body.
    Body,
}

impl Source {
    /// Maps the `from` annotation value. Anything unrecognized is `Path`.
    #[must_use]
    pub fn from_annotation(value: &str) -> Self {
        match value {
            "query" => Self::Query,
            "header" => Self::Header,
            "body" => Self::Body,
            _ => Self::Path,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Parsed per-field binding rules. Immutable once parsed.
///
/// # Example
///
/// ```rust
/// use valet_bind::{FieldMetadata, Source};
///
/// let meta = FieldMetadata::parse(r#"name:"age" from:"query" required min:"0" max:"130""#);
///
/// assert_eq!(meta.name, "age");
/// assert_eq!(meta.source, Source::Query);
/// assert!(meta.required);
/// assert_eq!(meta.min.as_deref(), Some("0"));
/// assert_eq!(meta.max.as_deref(), Some("130"));
/// assert_eq!(meta.default, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldMetadata {
    /// Wire key the value is looked up by.
    pub name: String,
    /// Source location.
    pub source: Source,
    /// Whether a missing value (with no default) is an error.
    pub required: bool,
    /// Declared lower bound, as text.
    pub min: Option<String>,
    /// Declared upper bound, as text.
    pub max: Option<String>,
    /// Declared default, as text.
    pub default: Option<String>,
    /// Declared regular expression the raw text must match.
    pub pattern: Option<String>,
}

impl FieldMetadata {
    /// Parses an annotation string.
    #[must_use]
    pub fn parse(annotation: &str) -> Self {
        let tags = Tags::parse(annotation);

        let name = tags
            .lookup("name")
            .or_else(|| {
                tags.lookup("json")
                    .map(|v| v.split(',').next().unwrap_or_default())
            })
            .unwrap_or_default()
            .to_string();

        let required = match tags.lookup("required") {
            None => false,
            Some("") => true,
            Some(text) => parse_bool(text).unwrap_or(true),
        };

        Self {
            name,
            source: tags.lookup("from").map(Source::from_annotation).unwrap_or_default(),
            required,
            min: tags.lookup("min").map(String::from),
            max: tags.lookup("max").map(String::from),
            default: tags.lookup("default").map(String::from),
            pattern: tags
                .lookup("pattern")
                .or_else(|| tags.lookup("regex"))
                .map(String::from),
        }
    }

    /// Parses an annotation, naming the field `field_name` when the
    /// annotation declares no wire name.
    #[must_use]
    pub fn parse_for_field(field_name: &str, annotation: &str) -> Self {
        let mut meta = Self::parse(annotation);
        if meta.name.is_empty() {
            meta.name = field_name.to_string();
        }
        meta
    }
}

/// Ordered key/value pairs read from an annotation.
struct Tags {
    pairs: Vec<(String, String)>,
}

impl Tags {
    fn parse(annotation: &str) -> Self {
        let mut pairs = Vec::new();
        let mut rest = annotation;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let key_end = rest
                .find(|c: char| c == ':' || c == '"' || c.is_whitespace())
                .unwrap_or(rest.len());
            let key = &rest[..key_end];
            if key.is_empty() {
                break;
            }
            rest = &rest[key_end..];

            let Some(after_colon) = rest.strip_prefix(':') else {
                if rest.starts_with('"') {
                    break;
                }
                pairs.push((key.to_string(), String::new()));
                continue;
            };

            let Some((value, remaining)) = read_quoted(after_colon) else {
                break;
            };
            pairs.push((key.to_string(), value));
            rest = remaining;
        }

        Self { pairs }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Reads a double-quoted value, returning it and the remaining input.
fn read_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut value = String::new();
    let mut chars = body.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((value, &body[idx + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => return None,
            },
            _ => value.push(c),
        }
    }

    None
}
