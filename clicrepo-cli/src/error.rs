//! CLI error type.

use std::path::PathBuf;

use clicrepo::catalog::CatalogError;
use clicrepo::config::ConfigError;
use clicrepo::download::FetchError;
use clicrepo::logging::LoggingError;
use clicrepo::SessionError;
use thiserror::Error;

/// Errors reported to the user before exiting with a non-zero status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid setting or argument combination.
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(String),

    #[error("export cancelled")]
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled => 130,
            CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Cancelled.exit_code(), 130);
        assert_eq!(CliError::Config("bad".into()).exit_code(), 2);
        assert_eq!(CliError::Runtime("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_catalog_error_message_passes_through() {
        let err: CliError = CatalogError::NotFound("math/sums".into()).into();
        assert_eq!(err.to_string(), "project not found: math/sums");
    }
}
