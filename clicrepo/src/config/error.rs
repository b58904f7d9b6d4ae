//! Configuration error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or parsed.
    #[error("failed to read config file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// The configuration file could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value does not parse for its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known configuration key.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}
