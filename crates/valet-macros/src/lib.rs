//! Procedural macros for Valet.
//!
//! `#[derive(Bind)]` builds the binding plan of a record from its fields and
//! their `#[bind(...)]` attributes. The plan is built once, on first use.
//!
//! # Field attributes
//!
//! | Attribute | Annotation |
//! |-----------|------------|
//! | `from = "query"` | `from:"query"` (`path`, `query`, `header`, `body`) |
//! | `name = "X-Id"` | `name:"X-Id"` |
//! | `required` / `required = true` | `required` |
//! | `min = 0`, `max = "1h"` | `min:"0"`, `max:"1h"` |
//! | `default = 20` | `default:"20"` |
//! | `pattern = "^\\d+$"` | `pattern:"^\d+$"` |
//! | `skip` | field is not bound |
//! | `"raw annotation"` | appended verbatim |
//!
//! # Container attributes
//!
//! `#[bind(crate = "valet::bind")]` points the generated code at the runtime
//! crate when it is not a direct `valet_bind` dependency.
//!
//! # Example
//!
//! ```rust,ignore
//! use valet_bind::{Bind, Binder, Record};
//!
//! #[derive(Default, Bind)]
//! struct CreatePet {
//!     #[bind(from = "header", name = "X-Tenant", required)]
//!     tenant: String,
//!     #[bind(from = "query", default = false)]
//!     dry_run: bool,
//!     #[bind(from = "body")]
//!     pet: Record<Pet>,
//! }
//!
//! let req: CreatePet = Binder::new().bind(&ctx)?;
//! ```

mod derive;
mod parse;

use proc_macro::TokenStream;

/// Derives `Bind` for a struct with named fields.
///
/// The struct must implement `Default` and every bound field's type must
/// implement `BindField`.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    derive::expand_bind(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
