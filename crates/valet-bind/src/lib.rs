//! # Valet Bind
//!
//! Declarative request binding and response encoding.
//!
//! A target record declares, per field, where its value comes from and how
//! it is validated. The [`Binder`] resolves each field from the request,
//! applies defaults, presence, bounds and pattern rules, and coerces the text
//! into the field's type. On the way out, [`ResponseEncoder`] negotiates a
//! wire format from `Accept` and writes the handler's [`Reply`].
//!
//! ## Field annotations
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `name` | Wire key (defaults to the field name) |
//! | `from` | `path` (default), `query`, `header` or `body` |
//! | `required` | Missing value without default is an error |
//! | `min` / `max` | Inclusive bounds, parsed for the field's type |
//! | `default` | Used when the source has no value; bounds are not checked |
//! | `pattern` | Regular expression the raw text must match |
//!
//! ## Example
//!
//! ```rust
//! use valet_bind::{Binder, BindPlan, Reply, RequestContext, ResponseEncoder};
//!
//! #[derive(Debug, Default)]
//! struct Greeting {
//!     name: String,
//!     times: u8,
//! }
//!
//! let plan = BindPlan::new()
//!     .field("name", r#"required"#, |g: &mut Greeting| &mut g.name)
//!     .field("times", r#"from:"query" default:"1" min:"1" max:"5""#, |g: &mut Greeting| &mut g.times);
//!
//! let ctx = RequestContext::builder()
//!     .uri("/hello/ada?times=2".parse().unwrap())
//!     .header("accept", "text/plain")
//!     .path_param("name", "ada")
//!     .build();
//!
//! let greeting = Binder::new().bind_with(&ctx, &plan).unwrap();
//! let lines: Vec<String> = (0..greeting.times).map(|_| format!("hello {}", greeting.name)).collect();
//!
//! let response = ResponseEncoder::default().respond(ctx.accept(), Reply::<()>::lines(lines));
//! assert_eq!(&response.body()[..], b"hello ada\nhello ada");
//! ```
//!
//! ## Byte fields in replies
//!
//! Byte fields are bound from base64 text. Mark them with
//! `#[serde(with = "valet_bind::base64")]` in reply types so encoded
//! replies carry the same text and can be bound again.
//!
//! ## Errors
//!
//! A failed bind yields a [`BindError`]: a [`FieldError`] naming the field
//! (answered with 400) or a [`DecodeError`] for a malformed structured body
//! (answered with 500).

#![doc(html_root_url = "https://docs.rs/valet-bind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod base64;
mod binder;
mod body;
pub mod coerce;
mod context;
mod duration;
mod encode;
mod error;
mod field;
mod metadata;
mod negotiate;
mod params;
mod pattern;
mod plan;
mod reply;
mod source;
mod timestamp;

pub use binder::Binder;
pub use context::{RequestContext, RequestContextBuilder};
pub use encode::{encode, encode_with, Encoded, Payload};
pub use error::{BindError, DecodeError, EncodeError, FieldError};
pub use field::{BindField, Record, Shape, Value};
pub use metadata::{FieldMetadata, Source};
pub use negotiate::{negotiate, negotiate_with_limit, ContentFormat, MediaSelection, MAX_INDENT};
pub use params::PathParams;
pub use pattern::{PatternCache, PatternError};
pub use plan::{Bind, BindPlan, FieldBinding};
pub use reply::{EncoderConfig, Reply, ReplyError, ResponseEncoder};
pub use source::{BindState, RawValue, SourceResolver};
