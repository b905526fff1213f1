//! Configuration types.
//!
//! [`ValetConfig`] groups the settings for the binder, the response encoder
//! and logging. Every section has defaults, so a partial file is enough.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use valet_bind::{Binder, EncoderConfig, PatternCache, ResponseEncoder, MAX_INDENT};
use valet_telemetry::{LogConfig, LogFormat};

use crate::ConfigError;

/// Complete Valet configuration.
///
/// # Example
///
/// ```
/// use valet_config::ValetConfig;
///
/// let config = ValetConfig::default();
/// assert!(config.encoder.no_content_on_empty);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValetConfig {
    /// Request binding settings.
    #[serde(default)]
    pub binder: BinderConfig,

    /// Response encoding settings.
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request binding settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinderConfig {
    /// Maximum number of compiled patterns kept; 0 means unbounded.
    pub pattern_cache_capacity: usize,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is installed at all.
    pub enabled: bool,
    /// Filter directive, e.g. `info` or `valet_bind=debug,warn`.
    pub level: String,
    /// Output layout.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ValetConfig {
    /// Debug logging in the pretty layout.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            ..Self::default()
        }
    }

    /// Info logging as JSON lines.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `encoder.max_indent` exceeds
    /// the indentation ceiling or the log level is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder.max_indent > MAX_INDENT {
            return Err(ConfigError::invalid_value(
                "encoder.max_indent",
                format!("must be at most {MAX_INDENT}, got {}", self.encoder.max_indent),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// The pattern cache described by the binder section.
    #[must_use]
    pub fn pattern_cache(&self) -> Arc<PatternCache> {
        Arc::new(PatternCache::with_capacity(self.binder.pattern_cache_capacity))
    }

    /// A binder using a fresh pattern cache.
    #[must_use]
    pub fn binder(&self) -> Binder {
        Binder::with_pattern_cache(self.pattern_cache())
    }

    /// A response encoder with the encoder section's settings.
    #[must_use]
    pub fn encoder(&self) -> ResponseEncoder {
        ResponseEncoder::new(self.encoder)
    }

    /// The logging section as a telemetry configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            format: self.logging.format,
            ..base
        }
    }
}
