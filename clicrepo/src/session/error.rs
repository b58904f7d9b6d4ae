//! Session error types.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::download::FetchError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by a [`DownloadSession`](super::DownloadSession).
#[derive(Debug, Error)]
pub enum SessionError {
    /// A file could not be downloaded; the whole run was aborted.
    #[error("download failed: {0}")]
    Network(#[from] FetchError),

    /// The archive could not be built.
    #[error("compression failed: {0}")]
    Compression(#[from] ArchiveError),

    /// Operation invoked in a state that does not allow it.
    #[error("cannot {operation} while the session is {state}")]
    Usage {
        operation: &'static str,
        state: &'static str,
    },

    /// The project manifest cannot be exported.
    #[error("invalid project: {0}")]
    InvalidProject(String),
}

impl SessionError {
    /// Whether this is a caller contract violation rather than a run failure.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage { .. })
    }
}
