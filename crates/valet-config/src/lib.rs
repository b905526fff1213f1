//! Typed, layered configuration for Valet.
//!
//! Settings are read from defaults, then a TOML or JSON file, then
//! `VALET__SECTION__KEY` environment variables. Unknown keys in files are
//! rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! [binder]
//! pattern_cache_capacity = 256   # 0 = unbounded
//!
//! [encoder]
//! no_content_on_empty = true     # empty body without a status answers 204
//! max_indent = 10
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"                # or "pretty"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use valet_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("valet.toml")?
//!     .with_env_prefix("VALET")
//!     .load()?;
//!
//! valet_telemetry::init_logging(&config.log_config())?;
//! let binder = config.binder();
//! let encoder = config.encoder();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::{BinderConfig, LoggingConfig, ValetConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use valet_bind::EncoderConfig;
pub use valet_telemetry::LogFormat;
