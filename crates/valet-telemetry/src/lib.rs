//! Structured logging for Valet.
//!
//! The binding and encoding crates emit `tracing` events: warnings for
//! skipped patterns, unusable body shapes and unparsable media types, and
//! debug events for pattern outcomes and negotiated formats. This crate
//! installs a `tracing-subscriber` pipeline that writes them as JSON lines
//! or in a human-readable layout.
//!
//! # Example
//!
//! ```rust,ignore
//! use valet_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(route = "/pets", "binding request");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
