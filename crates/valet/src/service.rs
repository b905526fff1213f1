//! Bind, call, encode.

use bytes::Bytes;
use http::Response;
use serde::Serialize;
use tracing::debug;
use valet_bind::{Bind, Binder, Reply, RequestContext, ResponseEncoder};
use valet_config::ValetConfig;

/// A binder and a response encoder used together around handlers.
///
/// # Example
///
/// ```rust
/// use valet::prelude::*;
///
/// #[derive(Debug, Default, Bind)]
/// #[bind(crate = "valet::bind")]
/// struct Add {
///     #[bind(from = "query", required)]
///     a: i64,
///     #[bind(from = "query", required)]
///     b: i64,
/// }
///
/// #[derive(serde::Serialize)]
/// struct Sum {
///     sum: i64,
/// }
///
/// let ctx = RequestContext::builder()
///     .uri("/add?a=1&b=2".parse().unwrap())
///     .header("accept", "application/json")
///     .build();
///
/// let response = Valet::new().handle(&ctx, |req: Add| Reply::data(Sum { sum: req.a + req.b }));
/// assert_eq!(&response.body()[..], br#"{"sum":3}"#);
/// ```
#[derive(Debug, Default)]
pub struct Valet {
    binder: Binder,
    encoder: ResponseEncoder,
}

impl Valet {
    /// Creates a service with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service from loaded configuration.
    #[must_use]
    pub fn from_config(config: &ValetConfig) -> Self {
        Self {
            binder: config.binder(),
            encoder: config.encoder(),
        }
    }

    /// Returns the binder.
    #[must_use]
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// Returns the response encoder.
    #[must_use]
    pub fn encoder(&self) -> &ResponseEncoder {
        &self.encoder
    }

    /// Binds the request into `T`, runs `handler`, and encodes its reply.
    ///
    /// A failed bind never reaches the handler; it is answered with the
    /// error envelope and the bind error's status.
    pub fn handle<T, R, F>(&self, ctx: &RequestContext, handler: F) -> Response<Bytes>
    where
        T: Bind,
        R: Serialize,
        F: FnOnce(T) -> Reply<R>,
    {
        match self.binder.bind::<T>(ctx) {
            Ok(target) => self.encoder.respond(ctx.accept(), handler(target)),
            Err(err) => {
                debug!(error = %err, code = err.error_code(), "request rejected");
                self.encoder.respond_bind_error(ctx.accept(), &err)
            }
        }
    }
}
