//! Compiled pattern cache.
//!
//! Field patterns are compiled on first use and reused across binds.

use std::collections::HashMap;

use parking_lot::RwLock;
use regex::Regex;
use thiserror::Error;

/// A declared pattern could not be used.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern text was empty.
    #[error("pattern is empty")]
    Empty,

    /// The pattern did not compile.
    #[error("invalid pattern: {0}")]
    Invalid(#[from] regex::Error),
}

/// Thread-safe cache of compiled patterns keyed by their source text.
///
/// Once `capacity` patterns are cached, new patterns are still compiled but
/// no longer stored. A capacity of zero means unbounded.
#[derive(Debug, Default)]
pub struct PatternCache {
    inner: RwLock<HashMap<String, Regex>>,
    capacity: usize,
}

impl PatternCache {
    /// Creates an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache that stores at most `capacity` patterns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Returns the compiled form of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the pattern is empty or invalid.
    pub fn get(&self, pattern: &str) -> Result<Regex, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        if let Some(re) = self.inner.read().get(pattern) {
            return Ok(re.clone());
        }

        let re = Regex::new(pattern)?;
        let mut cache = self.inner.write();
        if self.capacity == 0 || cache.len() < self.capacity {
            cache.insert(pattern.to_string(), re.clone());
        }
        Ok(re)
    }

    /// Returns the number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
