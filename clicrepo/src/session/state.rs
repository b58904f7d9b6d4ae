//! Session state machine.
//!
//! The session never mutates its state directly: every change goes through
//! [`transition`], which returns `None` for events that are not valid in the
//! current state. Late events from a cancelled run are dropped that way.

use std::fmt;

use super::artifact::Artifact;

/// Observable state of a download session.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Nothing running, nothing produced.
    #[default]
    Idle,
    /// Fetching project files.
    Downloading { completed: usize, total: usize },
    /// Building the archive.
    Compressing { percent: u8 },
    /// Archive ready to be saved.
    Ready(Artifact),
    /// The last run failed.
    Error(String),
    /// The last run was cancelled by the user.
    Cancelled,
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new run begins with `total` files to fetch.
    Start { total: usize },
    /// One more file was fetched.
    FileDownloaded { completed: usize },
    /// Every file was fetched.
    DownloadsFinished,
    /// Compression advanced.
    CompressProgress(u8),
    /// The archive was produced.
    Compressed(Artifact),
    /// A download or compression failure.
    Failed(String),
    /// User cancellation.
    Cancel,
    /// The artifact was handed over for saving.
    ArtifactTaken,
}

impl SessionState {
    /// Short name used in logs and usage errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading { .. } => "downloading",
            Self::Compressing { .. } => "compressing",
            Self::Ready(_) => "ready",
            Self::Error(_) => "error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a run is in progress.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Downloading { .. } | Self::Compressing { .. })
    }

    /// Whether `start` is allowed.
    pub fn can_start(&self) -> bool {
        !self.is_busy()
    }

    /// Whether the artifact can be taken.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Overall phase progress as a whole percentage.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Self::Downloading { completed, total } => crate::download::percent(*completed, *total),
            Self::Compressing { percent } => *percent,
            Self::Ready(_) => 100,
            _ => 0,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloading { completed, total } => {
                write!(f, "downloading ({}/{})", completed, total)
            }
            Self::Compressing { percent } => write!(f, "compressing ({}%)", percent),
            Self::Ready(artifact) => write!(f, "ready ({})", artifact.file_name),
            Self::Error(msg) => write!(f, "error: {}", msg),
            other => f.write_str(other.name()),
        }
    }
}

/// Compute the next state, or `None` if `event` is invalid in `state`.
pub fn transition(state: &SessionState, event: SessionEvent) -> Option<SessionState> {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (s, E::Start { total }) if s.can_start() => Some(S::Downloading {
            completed: 0,
            total,
        }),
        (S::Downloading { total, .. }, E::FileDownloaded { completed }) => Some(S::Downloading {
            completed,
            total: *total,
        }),
        (S::Downloading { .. }, E::DownloadsFinished) => Some(S::Compressing { percent: 0 }),
        (S::Compressing { .. }, E::CompressProgress(percent)) => {
            Some(S::Compressing { percent })
        }
        (S::Compressing { .. }, E::Compressed(artifact)) => Some(S::Ready(artifact)),
        (S::Downloading { .. } | S::Compressing { .. }, E::Failed(msg)) => Some(S::Error(msg)),
        (S::Idle, E::Cancel) => Some(S::Idle),
        (_, E::Cancel) => Some(S::Cancelled),
        (S::Ready(_), E::ArtifactTaken) => Some(S::Idle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn artifact() -> Artifact {
        Artifact::new("p1.scorm.zip", Bytes::from_static(b"PK"), 3)
    }

    #[test]
    fn test_happy_path() {
        let s = SessionState::Idle;
        let s = transition(&s, SessionEvent::Start { total: 2 }).unwrap();
        assert!(matches!(s, SessionState::Downloading { completed: 0, total: 2 }));

        let s = transition(&s, SessionEvent::FileDownloaded { completed: 2 }).unwrap();
        assert_eq!(s.progress_percent(), 100);

        let s = transition(&s, SessionEvent::DownloadsFinished).unwrap();
        assert!(matches!(s, SessionState::Compressing { percent: 0 }));

        let s = transition(&s, SessionEvent::CompressProgress(50)).unwrap();
        assert_eq!(s.progress_percent(), 50);

        let s = transition(&s, SessionEvent::Compressed(artifact())).unwrap();
        assert!(s.is_ready());

        let s = transition(&s, SessionEvent::ArtifactTaken).unwrap();
        assert!(matches!(s, SessionState::Idle));
    }

    #[test]
    fn test_start_rejected_while_busy() {
        let downloading = SessionState::Downloading {
            completed: 0,
            total: 1,
        };
        assert!(transition(&downloading, SessionEvent::Start { total: 1 }).is_none());
        let compressing = SessionState::Compressing { percent: 10 };
        assert!(transition(&compressing, SessionEvent::Start { total: 1 }).is_none());
    }

    #[test]
    fn test_start_allowed_from_terminal_states() {
        for state in [
            SessionState::Idle,
            SessionState::Ready(artifact()),
            SessionState::Error("x".to_string()),
            SessionState::Cancelled,
        ] {
            assert!(
                transition(&state, SessionEvent::Start { total: 0 }).is_some(),
                "start from {state}"
            );
        }
    }

    #[test]
    fn test_cancel_from_any_state() {
        assert!(matches!(
            transition(&SessionState::Idle, SessionEvent::Cancel),
            Some(SessionState::Idle)
        ));
        for state in [
            SessionState::Downloading {
                completed: 1,
                total: 3,
            },
            SessionState::Compressing { percent: 3 },
            SessionState::Ready(artifact()),
            SessionState::Error("x".to_string()),
            SessionState::Cancelled,
        ] {
            assert!(matches!(
                transition(&state, SessionEvent::Cancel),
                Some(SessionState::Cancelled)
            ));
        }
    }

    #[test]
    fn test_late_events_after_cancel_are_dropped() {
        let s = SessionState::Cancelled;
        assert!(transition(&s, SessionEvent::FileDownloaded { completed: 1 }).is_none());
        assert!(transition(&s, SessionEvent::DownloadsFinished).is_none());
        assert!(transition(&s, SessionEvent::Compressed(artifact())).is_none());
        assert!(transition(&s, SessionEvent::Failed("x".to_string())).is_none());
    }

    #[test]
    fn test_artifact_taken_only_when_ready() {
        assert!(transition(&SessionState::Idle, SessionEvent::ArtifactTaken).is_none());
        assert!(transition(&SessionState::Cancelled, SessionEvent::ArtifactTaken).is_none());
    }

    #[test]
    fn test_display() {
        let s = SessionState::Downloading {
            completed: 1,
            total: 4,
        };
        assert_eq!(s.to_string(), "downloading (1/4)");
        assert_eq!(SessionState::Cancelled.to_string(), "cancelled");
    }
}
