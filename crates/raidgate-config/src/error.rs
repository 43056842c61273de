//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration file was not valid YAML for the expected shape.
    #[error("invalid YAML in {}", .path.display())]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Source YAML error.
        source: serde_yaml::Error,
    },
    /// A required field was empty or absent.
    #[error("{field} must be set")]
    MissingField {
        /// Dotted field name.
        field: &'static str,
    },
    /// A configured path does not exist.
    #[error("{field} not found: {}", .path.display())]
    PathNotFound {
        /// Dotted field name.
        field: &'static str,
        /// Offending path.
        path: PathBuf,
        /// Source IO error from the existence check.
        source: io::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// Dotted field name.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Human-readable error description.
        message: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
