//! Status updates pushed to the UI layer.

use std::sync::Arc;

/// Callback receiving every status update.
pub type StatusCallback = Arc<dyn Fn(&SessionStatus) + Send + Sync>;

/// What the UI shows for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    /// Phase description.
    pub message: String,
    /// Current file or entry name.
    pub status: String,
    /// Phase progress (0-100).
    pub progress: u8,
    /// Error message, if the session failed.
    pub error: Option<String>,
}

impl SessionStatus {
    pub(crate) fn phase(message: &str, status: impl Into<String>, progress: u8) -> Self {
        Self {
            message: message.to_string(),
            status: status.into(),
            progress,
            error: None,
        }
    }

    pub(crate) fn failed(message: &str, error: String) -> Self {
        Self {
            message: message.to_string(),
            status: String::new(),
            progress: 0,
            error: Some(error),
        }
    }
}
