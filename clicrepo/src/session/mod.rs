//! Download sessions: one project export from fetch to finished archive.
//!
//! A session drives the download pool, then the archive builder, through an
//! explicit state machine (see [`state`]). It owns the cancellation token of
//! the active run; `cancel()` aborts every outstanding fetch and discards
//! whatever was collected so far.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clicrepo::{DownloadConfig, DownloadSession, HttpFetcher, SessionState};
//!
//! let session = DownloadSession::new(Arc::new(HttpFetcher::new()?), &DownloadConfig::default());
//! session.start(&project).await?;
//! if let SessionState::Ready(_) = session.state() {
//!     let artifact = session.download_artifact()?;
//!     artifact.save_to(Path::new("."))?;
//! }
//! ```

mod artifact;
mod error;
pub mod state;
mod status;

pub use artifact::Artifact;
pub use error::{SessionError, SessionResult};
pub use state::{transition, SessionEvent, SessionState};
pub use status::{SessionStatus, StatusCallback};

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveBuilder, ArchiveError, CompressProgress, CompressProgressCallback};
use crate::config::DownloadConfig;
use crate::download::{
    tasks_for_project, BinaryFetcher, DownloadPool, DownloadProgress, DownloadTask, PoolError,
};
use crate::project::{directory_url, Project, MANIFEST_FILE};

/// Status message while files are being fetched.
pub const MSG_DOWNLOADING: &str = "Downloading files";
/// Status message while the archive is being built.
pub const MSG_COMPRESSING: &str = "Compressing files";
/// Status message once the artifact is available.
pub const MSG_READY: &str = "Archive ready";
/// Status message after a failed run.
pub const MSG_FAILED: &str = "Export failed";
/// Status message after cancellation.
pub const MSG_CANCELLED: &str = "Export cancelled";

/// Everything needed to run one export, computed before the run starts.
struct ExportPlan {
    tasks: Vec<DownloadTask>,
    manifest: String,
    artifact_name: String,
}

struct ActiveRun {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    run: Option<ActiveRun>,
    next_run_id: u64,
}

/// Exports one project at a time as a SCORM ZIP archive.
pub struct DownloadSession {
    pool: DownloadPool,
    base_url: Option<Url>,
    debug: bool,
    inner: Mutex<Inner>,
    on_status: Option<StatusCallback>,
}

impl DownloadSession {
    /// Create a session fetching through `fetcher`.
    pub fn new(fetcher: Arc<dyn BinaryFetcher>, config: &DownloadConfig) -> Self {
        Self {
            pool: DownloadPool::new(fetcher, config.concurrency),
            base_url: None,
            debug: config.debug,
            inner: Mutex::new(Inner::default()),
            on_status: None,
        }
    }

    /// Repository base URL for projects that carry no `fullPath`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Receive status updates.
    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// Number of fetches still in flight.
    pub fn active_fetches(&self) -> usize {
        self.pool.active_handles()
    }

    /// Maximum concurrent fetches.
    pub fn concurrency(&self) -> usize {
        self.pool.concurrency()
    }

    /// Export `project`.
    ///
    /// Resolves when the run ends. On success or cancellation the result is
    /// `Ok` and the outcome is visible through [`state`](Self::state); a
    /// failed run leaves the session in `Error` and returns the cause.
    /// Starting while another run is active is a usage error.
    pub async fn start(&self, project: &Project) -> SessionResult<()> {
        let plan = self.plan(project)?;
        let total = plan.tasks.len();
        let (run_id, token) = self.begin(total)?;

        if self.debug {
            info!(threads = self.pool.concurrency(), files = total, project = %project.path, "Starting export");
        } else {
            debug!(files = total, project = %project.path, "Starting export");
        }
        self.emit(SessionStatus::phase(MSG_DOWNLOADING, "", 0));

        let result = self.run(run_id, &token, plan).await;
        self.finish(run_id, result)
    }

    /// Cancel the active run, or discard a finished artifact.
    ///
    /// Safe to call repeatedly and in any state.
    pub fn cancel(&self) {
        let previous = {
            let mut inner = self.inner.lock();
            if let Some(run) = inner.run.take() {
                run.token.cancel();
            }
            let previous = inner.state.name();
            if let Some(next) = transition(&inner.state, SessionEvent::Cancel) {
                inner.state = next;
            }
            previous
        };

        self.pool.abort_all();

        if previous != "idle" && previous != "cancelled" {
            info!(from = previous, "Export cancelled");
            self.emit(SessionStatus::phase(MSG_CANCELLED, "", 0));
        }
    }

    /// Hand over the finished archive and reset to `Idle`.
    ///
    /// Only valid in the `Ready` state.
    pub fn download_artifact(&self) -> SessionResult<Artifact> {
        let mut inner = self.inner.lock();
        let artifact = match &inner.state {
            SessionState::Ready(artifact) => artifact.clone(),
            other => {
                return Err(SessionError::Usage {
                    operation: "download the artifact",
                    state: other.name(),
                })
            }
        };
        if let Some(next) = transition(&inner.state, SessionEvent::ArtifactTaken) {
            inner.state = next;
        }
        Ok(artifact)
    }

    fn plan(&self, project: &Project) -> SessionResult<ExportPlan> {
        if project.main_file.trim().is_empty() {
            return Err(SessionError::InvalidProject(
                "manifest has no main file".to_string(),
            ));
        }

        let rewrite = project
            .path_rewrite()
            .map_err(|e| SessionError::InvalidProject(format!("bad main file path: {}", e)))?;
        let base = self.project_base(project)?;
        let tasks =
            tasks_for_project(project, &base, &rewrite).map_err(SessionError::InvalidProject)?;
        let manifest = project
            .normalized_manifest(&rewrite)
            .map_err(|e| SessionError::InvalidProject(e.to_string()))?;

        Ok(ExportPlan {
            tasks,
            manifest,
            artifact_name: project.artifact_name(),
        })
    }

    fn project_base(&self, project: &Project) -> SessionResult<Url> {
        if let Some(full_path) = &project.full_path {
            return directory_url(full_path).map_err(SessionError::InvalidProject);
        }

        let path = project.path.trim_matches('/');
        match &self.base_url {
            Some(base) if !path.is_empty() => base
                .join(&format!("{}/", path))
                .map_err(|e| SessionError::InvalidProject(e.to_string())),
            _ => Err(SessionError::InvalidProject(
                "project has no fullPath and no repository base URL".to_string(),
            )),
        }
    }

    fn begin(&self, total: usize) -> SessionResult<(u64, CancellationToken)> {
        let mut inner = self.inner.lock();
        let next = transition(&inner.state, SessionEvent::Start { total }).ok_or(
            SessionError::Usage {
                operation: "start a download",
                state: inner.state.name(),
            },
        )?;

        let id = inner.next_run_id;
        inner.next_run_id += 1;
        let token = CancellationToken::new();
        inner.state = next;
        inner.run = Some(ActiveRun {
            id,
            token: token.clone(),
        });
        Ok((id, token))
    }

    /// Apply `event` if `run_id` is still the active run.
    ///
    /// Terminal events also release the run's token.
    fn apply(&self, run_id: u64, event: SessionEvent, terminal: bool) -> bool {
        let mut inner = self.inner.lock();
        if inner.run.as_ref().map(|r| r.id) != Some(run_id) {
            return false;
        }
        match transition(&inner.state, event) {
            Some(next) => {
                inner.state = next;
                if terminal {
                    inner.run = None;
                }
                true
            }
            None => false,
        }
    }

    /// Run both phases. `Ok(None)` means the run was cancelled.
    async fn run(
        &self,
        run_id: u64,
        token: &CancellationToken,
        plan: ExportPlan,
    ) -> SessionResult<Option<Artifact>> {
        let on_progress = move |p: &DownloadProgress| {
            let event = SessionEvent::FileDownloaded {
                completed: p.completed,
            };
            if self.apply(run_id, event, false) {
                self.emit(SessionStatus::phase(
                    MSG_DOWNLOADING,
                    p.last_entry.clone(),
                    p.percent(),
                ));
            }
        };

        let files = match self.pool.run(plan.tasks, token, Some(&on_progress)).await {
            Ok(files) => files,
            Err(PoolError::Cancelled) => return Ok(None),
            Err(PoolError::Fetch(e)) => return Err(e.into()),
        };
        if token.is_cancelled() {
            return Ok(None);
        }

        let mut builder = ArchiveBuilder::new();
        for file in files {
            builder.add_entry(file.entry_name, file.data)?;
        }
        builder.add_manifest(MANIFEST_FILE, plan.manifest)?;
        let entries = builder.len();

        if !self.apply(run_id, SessionEvent::DownloadsFinished, false) {
            return Ok(None);
        }
        self.emit(SessionStatus::phase(MSG_COMPRESSING, "", 0));

        let (tx, mut rx) = mpsc::unbounded_channel::<CompressProgress>();
        let on_compress: CompressProgressCallback = Arc::new(move |p: &CompressProgress| {
            let _ = tx.send(p.clone());
        });

        let build = builder.build(token.clone(), Some(on_compress));
        tokio::pin!(build);

        let result = loop {
            tokio::select! {
                result = &mut build => break result,
                Some(p) = rx.recv() => {
                    if self.apply(run_id, SessionEvent::CompressProgress(p.percent), false) {
                        self.emit(SessionStatus::phase(MSG_COMPRESSING, p.current_entry, p.percent));
                    }
                }
            }
        };

        match result {
            Ok(data) => Ok(Some(Artifact::new(plan.artifact_name, data, entries))),
            Err(ArchiveError::Aborted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn finish(&self, run_id: u64, result: SessionResult<Option<Artifact>>) -> SessionResult<()> {
        match result {
            Ok(Some(artifact)) => {
                let file_name = artifact.file_name.clone();
                let size = artifact.len();
                if self.apply(run_id, SessionEvent::Compressed(artifact), true) {
                    info!(file = %file_name, size, "Archive ready");
                    self.emit(SessionStatus::phase(MSG_READY, file_name, 100));
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                let message = err.to_string();
                if self.apply(run_id, SessionEvent::Failed(message.clone()), true) {
                    warn!(error = %message, "Export failed");
                    self.pool.abort_all();
                    self.emit(SessionStatus::failed(MSG_FAILED, message));
                    Err(err)
                } else {
                    // Cancelled while the failure was in flight
                    Ok(())
                }
            }
        }
    }

    fn emit(&self, status: SessionStatus) {
        if let Some(cb) = &self.on_status {
            cb(&status);
        }
    }
}

impl std::fmt::Debug for DownloadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadSession")
            .field("state", &self.inner.lock().state.name())
            .field("pool", &self.pool)
            .finish()
    }
}
