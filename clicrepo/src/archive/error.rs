//! Error types for archive assembly.

use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while building an archive.
///
/// Kept apart from download errors: a failed compression is never reported
/// as a network problem.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The ZIP writer rejected an entry or failed to finish.
    #[error("failed to compress {entry}: {reason}")]
    Zip { entry: String, reason: String },

    /// Two entries resolved to the same name.
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// Compression was cancelled before it finished.
    #[error("compression aborted")]
    Aborted,

    /// The compression worker panicked or was cancelled by the runtime.
    #[error("compression worker failed: {0}")]
    Join(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::DuplicateEntry("img1.png".to_string());
        assert_eq!(err.to_string(), "duplicate archive entry: img1.png");

        let err = ArchiveError::Zip {
            entry: "a.bin".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("a.bin"));
    }
}
