//! # Valet
//!
//! Declarative request binding and response encoding.
//!
//! Handlers declare the record they expect. Valet fills it from path
//! parameters, the query string, headers and the body, enforces the
//! declared rules, and answers the handler's [`Reply`](bind::Reply) in the
//! format the client asked for.
//!
//! ## Quick Start
//!
//! ```rust
//! use valet::prelude::*;
//!
//! #[derive(Debug, Default, Bind)]
//! #[bind(crate = "valet::bind")]
//! struct GetPet {
//!     #[bind(required, pattern = "^[0-9]+$")]
//!     id: u64,
//!     #[bind(from = "query", default = false)]
//!     verbose: bool,
//! }
//!
//! let ctx = RequestContext::builder()
//!     .uri("/pets/7".parse().unwrap())
//!     .header("accept", "text/plain")
//!     .path_param("id", "7")
//!     .build();
//!
//! let response = Valet::new().handle(&ctx, |req: GetPet| Reply::<()>::text(format!("pet {}", req.id)));
//! assert_eq!(&response.body()[..], b"pet 7");
//! ```
//!
//! ## Crates
//!
//! - [`bind`]: binding, coercion, negotiation and encoding
//! - [`config`]: layered configuration
//! - [`telemetry`]: logging setup

#![doc(html_root_url = "https://docs.rs/valet/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod service;

pub use service::Valet;

pub use valet_bind as bind;
pub use valet_config as config;
pub use valet_telemetry as telemetry;

pub use valet_macros::Bind;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use valet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Valet;

    pub use valet_bind::{
        Bind, BindError, Binder, BindPlan, FieldError, Payload, Record, Reply, RequestContext,
        ResponseEncoder,
    };

    pub use valet_macros::Bind;

    pub use valet_config::{ConfigLoader, ValetConfig};
}
