//! The matched request handed over by the routing collaborator.
//!
//! [`RequestContext`] exposes the four sources a field can be bound from:
//! captured path variables, the query string, headers and the body.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use tracing::debug;

use crate::PathParams;

/// A matched request: path variables, query string, headers and body.
///
/// The body is held in full; the binder reads it at most once per bind.
///
/// # Example
///
/// ```rust
/// use valet_bind::{PathParams, RequestContext};
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let mut params = PathParams::new();
/// params.push("id", "123");
///
/// let ctx = RequestContext::new(
///     Method::GET,
///     Uri::from_static("/users/123?verbose=1"),
///     HeaderMap::new(),
///     Bytes::new(),
///     params,
/// );
///
/// assert_eq!(ctx.path_params().get("id"), Some("123"));
/// assert_eq!(ctx.query_string(), Some("verbose=1"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl RequestContext {
    /// Creates a request context.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: PathParams,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
        }
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header as text.
    ///
    /// Values that are not visible ASCII are treated as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let value = self.headers.get(name)?;
        match value.to_str() {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(header = name, error = %e, "ignoring non-ascii header value");
                None
            }
        }
    }

    /// Returns the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// Returns the `Accept` header.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.header(http::header::ACCEPT.as_str())
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the captured path variables.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }
}

/// Builder for [`RequestContext`], mostly used by adapters and tests.
///
/// Method defaults to `GET` and the URI to `/`.
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl RequestContextBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Appends a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a captured path variable.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            method: self.method.unwrap_or_default(),
            uri: self.uri.unwrap_or_default(),
            headers: self.headers,
            body: self.body,
            path_params: self.path_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let ctx = RequestContext::builder().build();

        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.uri().path(), "/");
        assert_eq!(ctx.query_string(), None);
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn test_builder_full() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/api/users?dry_run=true"))
            .header("content-type", "application/json")
            .header("accept", "application/xml; indent=2")
            .body(r#"{"name": "Alice"}"#)
            .path_param("version", "v1")
            .build();

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.query_string(), Some("dry_run=true"));
        assert_eq!(ctx.content_type(), Some("application/json"));
        assert_eq!(ctx.accept(), Some("application/xml; indent=2"));
        assert_eq!(ctx.path_params().get("version"), Some("v1"));
        assert!(!ctx.body().is_empty());
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let ctx = RequestContext::builder()
            .header("bad header", "x")
            .build();

        assert!(ctx.headers().is_empty());
    }

    #[test]
    fn test_non_ascii_header_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-name", HeaderValue::from_bytes(b"caf\xe9").unwrap());
        let ctx = RequestContext::new(
            Method::GET,
            Uri::from_static("/"),
            headers,
            Bytes::new(),
            PathParams::new(),
        );

        assert!(ctx.headers().contains_key("x-name"));
        assert_eq!(ctx.header("x-name"), None);
    }

    #[test]
    fn test_first_header_value_wins() {
        let ctx = RequestContext::builder()
            .header("x-tenant", "a")
            .header("x-tenant", "b")
            .build();

        assert_eq!(ctx.header("x-tenant"), Some("a"));
    }
}
