//! # Design
//!
//! - Validation failures name the section and field so operators can fix the file directly.
//! - IO and parse failures keep the offending path and the source error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Structured errors emitted while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid value for '{field}' in '{section}': {message}")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable error description.
        message: String,
    },
    /// A required field was absent.
    #[error("missing required '{field}' in '{section}'")]
    MissingField {
        /// Section containing the field.
        section: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// The configuration file could not be read.
    #[error("failed to read configuration file")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration file was not valid YAML for the expected shape.
    #[error("failed to parse configuration file")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            section,
            field,
            message: message.into(),
        }
    }
}
