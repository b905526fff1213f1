//! Captured path variables.
//!
//! The router collaborator matches a route and hands over the variables it
//! captured. Lookups are case-sensitive and exact.

use smallvec::SmallVec;

/// Maximum number of variables stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Path variables captured by the external router.
///
/// # Example
///
/// ```rust
/// use valet_bind::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("userId", "123");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get("userid"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a captured variable.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        let params: PathParams = [("Id", "7")].into_iter().collect();

        assert_eq!(params.get("Id"), Some("7"));
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_first_capture_wins() {
        let mut params = PathParams::new();
        params.push("a", "1");
        params.push("a", "2");

        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_many_params() {
        let mut params = PathParams::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
        assert_eq!(params.iter().count(), 10);
        assert!(!params.is_empty());
    }
}
