//! Error types for the download pipeline.

use std::io;

use thiserror::Error;

/// Result type for single-file fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while fetching one file.
///
/// Every variant carries the URL that failed so a session-level error can
/// point at the offending file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or protocol failure.
    #[error("failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Network timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read.
    #[error("failed to read response from {url}: {reason}")]
    Body { url: String, reason: String },

    /// Local file access failed.
    #[error("failed to read local file {url}: {source}")]
    Local {
        url: String,
        #[source]
        source: io::Error,
    },

    /// URL is malformed or its scheme is not allowed.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// URL of the failing request, if the error is tied to one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Transport { url, .. }
            | Self::Timeout { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. }
            | Self::Local { url, .. }
            | Self::InvalidUrl { url, .. } => Some(url),
            Self::Client(_) => None,
        }
    }

    /// HTTP status code, for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from a whole pool run.
#[derive(Debug, Error)]
pub enum PoolError {
    /// One task failed; every other task was aborted.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The run was cancelled from outside.
    #[error("download cancelled")]
    Cancelled,
}
