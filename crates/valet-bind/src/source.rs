//! Source resolution.
//!
//! Looks up a field's raw value in its declared source and applies the
//! field's pattern to text that was found.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::{FieldError, FieldMetadata, PatternCache, RequestContext, Source};

/// What a source produced for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Text from the path, query string or a header.
    Text(String),
    /// The whole request body. Never empty.
    Body(Bytes),
    /// The source had no value.
    NotFound,
}

/// Per-bind scratch state shared by the fields of one record.
///
/// Holds the parsed query string and whether the body was handed out.
#[derive(Debug, Default)]
pub struct BindState {
    query: Option<Vec<(String, String)>>,
    body_taken: bool,
}

impl BindState {
    /// Creates fresh state for one bind.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn query(&mut self, ctx: &RequestContext) -> &[(String, String)] {
        self.query.get_or_insert_with(|| {
            let raw = ctx.query_string().unwrap_or_default();
            serde_urlencoded::from_str(raw).unwrap_or_else(|e| {
                warn!(query = raw, error = %e, "unparsable query string");
                Vec::new()
            })
        })
    }

    fn take_body(&mut self, ctx: &RequestContext) -> Option<Bytes> {
        if std::mem::replace(&mut self.body_taken, true) {
            return None;
        }
        Some(ctx.body().clone()).filter(|b| !b.is_empty())
    }
}

/// Resolves raw field values from a request.
///
/// Owns the compiled pattern cache. Cloning shares the cache.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    patterns: Arc<PatternCache>,
}

impl SourceResolver {
    /// Creates a resolver with an unbounded pattern cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver using the given pattern cache.
    #[must_use]
    pub fn with_patterns(patterns: Arc<PatternCache>) -> Self {
        Self { patterns }
    }

    /// Returns the pattern cache.
    #[must_use]
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Resolves the raw value of one field.
    ///
    /// # Errors
    ///
    /// Returns an "invalid match" [`FieldError`] when found text does not
    /// match the field's pattern.
    pub fn resolve(
        &self,
        metadata: &FieldMetadata,
        ctx: &RequestContext,
        state: &mut BindState,
    ) -> Result<RawValue, FieldError> {
        let name = metadata.name.as_str();

        let text = match metadata.source {
            Source::Path => ctx.path_params().get(name).map(String::from),
            Source::Header => ctx
                .header(name)
                .filter(|v| !v.is_empty())
                .map(String::from),
            Source::Query => state
                .query(ctx)
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            Source::Body => {
                return Ok(state.take_body(ctx).map_or(RawValue::NotFound, RawValue::Body));
            }
        };

        let Some(text) = text else {
            return Ok(RawValue::NotFound);
        };

        if let Some(pattern) = metadata.pattern.as_deref() {
            self.check_pattern(name, pattern, &text)?;
        }

        Ok(RawValue::Text(text))
    }

    fn check_pattern(&self, name: &str, pattern: &str, text: &str) -> Result<(), FieldError> {
        let re = match self.patterns.get(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(field = name, pattern, error = %e, "skipping unusable pattern");
                return Ok(());
            }
        };

        let matched = re.is_match(text);
        debug!(field = name, pattern, value = text, matched, "pattern check");
        if matched {
            Ok(())
        } else {
            Err(FieldError::invalid_match(name, text))
        }
    }
}
