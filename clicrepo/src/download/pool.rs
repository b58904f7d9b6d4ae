//! Bounded concurrent download pool.
//!
//! Runs a batch of [`DownloadTask`]s with at most `concurrency` fetches in
//! flight. The pool is fail-fast: the first failure aborts every outstanding
//! fetch and the run resolves with that error once all of them have settled.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{FetchError, PoolError};
use super::fetch::BinaryFetcher;
use super::handles::HandleSet;
use super::progress::{DownloadProgress, DownloadProgressFn};
use super::task::{DownloadTask, DownloadedFile};

/// Default maximum number of fetches in flight.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Outcome of a single task inside a run.
enum TaskOutcome {
    Done(DownloadedFile),
    Failed(FetchError),
    Aborted,
}

/// Concurrent download pool with a fixed concurrency cap.
pub struct DownloadPool {
    fetcher: Arc<dyn BinaryFetcher>,
    concurrency: usize,
    handles: Arc<HandleSet>,
}

impl std::fmt::Debug for DownloadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPool")
            .field("concurrency", &self.concurrency)
            .field("active", &self.handles.active())
            .finish()
    }
}

impl DownloadPool {
    /// Create a pool.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetcher used for every task
    /// * `concurrency` - Maximum fetches in flight (minimum 1)
    pub fn new(fetcher: Arc<dyn BinaryFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            handles: Arc::new(HandleSet::new()),
        }
    }

    /// Maximum number of fetches in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of fetches that have not resolved yet.
    pub fn active_handles(&self) -> usize {
        self.handles.active()
    }

    /// Abort every outstanding fetch.
    ///
    /// Idempotent; does nothing when no fetch is in flight.
    pub fn abort_all(&self) {
        let aborted = self.handles.abort_all();
        if aborted > 0 {
            debug!(aborted, "Aborted in-flight fetches");
        }
    }

    /// Fetch every task.
    ///
    /// Results are returned in task order. Cancelling `cancel` aborts the run
    /// and yields [`PoolError::Cancelled`]; the first fetch failure aborts the
    /// run and yields that failure.
    pub async fn run(
        &self,
        tasks: Vec<DownloadTask>,
        cancel: &CancellationToken,
        on_progress: Option<&DownloadProgressFn<'_>>,
    ) -> Result<Vec<DownloadedFile>, PoolError> {
        let total = tasks.len();
        let run_token = cancel.child_token();

        info!(total, concurrency = self.concurrency, "Starting downloads");

        let mut results: Vec<Option<DownloadedFile>> = (0..total).map(|_| None).collect();
        let mut completed = 0usize;
        let mut first_error: Option<FetchError> = None;

        let mut outcomes = stream::iter(tasks)
            .map(|task| self.fetch_one(task, &run_token))
            .buffer_unordered(self.concurrency);

        // Drain the whole stream even after a failure so the run only
        // resolves once every in-flight fetch has observed its abort.
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                TaskOutcome::Done(file) => {
                    if first_error.is_some() || run_token.is_cancelled() {
                        continue;
                    }
                    completed += 1;
                    debug!(entry = %file.entry_name, completed, total, "Downloaded");
                    if let Some(cb) = on_progress {
                        cb(&DownloadProgress {
                            completed,
                            total,
                            last_entry: file.entry_name.clone(),
                        });
                    }
                    let index = file.index;
                    if let Some(slot) = results.get_mut(index) {
                        *slot = Some(file);
                    }
                }
                TaskOutcome::Failed(err) => {
                    if first_error.is_none() && !run_token.is_cancelled() {
                        warn!(error = %err, "Download failed, aborting remaining files");
                        first_error = Some(err);
                        run_token.cancel();
                        self.abort_all();
                    }
                }
                TaskOutcome::Aborted => {}
            }
        }

        if let Some(err) = first_error {
            return Err(PoolError::Fetch(err));
        }
        if run_token.is_cancelled() {
            info!(completed, total, "Downloads cancelled");
            return Err(PoolError::Cancelled);
        }

        info!(completed, "All downloads finished");
        Ok(results.into_iter().flatten().collect())
    }

    async fn fetch_one(&self, task: DownloadTask, run_token: &CancellationToken) -> TaskOutcome {
        let handle = self.handles.register(run_token);
        if handle.is_aborted() {
            return TaskOutcome::Aborted;
        }

        tokio::select! {
            biased;

            _ = handle.aborted() => TaskOutcome::Aborted,

            result = self.fetcher.fetch(&task.url) => match result {
                Ok(data) => TaskOutcome::Done(DownloadedFile {
                    index: task.index,
                    entry_name: task.entry_name,
                    data,
                }),
                Err(err) => TaskOutcome::Failed(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::fetch::FetchFuture;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetcher that sleeps, tracks peak concurrency and fails selected URLs.
    #[derive(Default)]
    struct TrackingFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        started: AtomicUsize,
        fail: Vec<String>,
        hang: Vec<String>,
        delay_ms: u64,
    }

    impl BinaryFetcher for TrackingFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                self.started.fetch_add(1, Ordering::SeqCst);
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);

                struct Guard<'g>(&'g AtomicUsize);
                impl Drop for Guard<'_> {
                    fn drop(&mut self) {
                        self.0.fetch_sub(1, Ordering::SeqCst);
                    }
                }
                let _guard = Guard(&self.in_flight);

                if self.hang.iter().any(|h| h == url) {
                    std::future::pending::<()>().await;
                }
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

                if self.fail.iter().any(|f| f == url) {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: 404,
                    });
                }
                Ok(Bytes::from(url.to_string()))
            })
        }
    }

    fn make_tasks(n: usize) -> Vec<DownloadTask> {
        (0..n)
            .map(|i| DownloadTask {
                index: i,
                url: format!("http://test/{i}"),
                source_path: format!("dir/{i}"),
                entry_name: format!("{i}"),
            })
            .collect()
    }

    #[test]
    fn test_min_concurrency() {
        let pool = DownloadPool::new(Arc::new(TrackingFetcher::default()), 0);
        assert_eq!(pool.concurrency(), 1);
    }

    #[tokio::test]
    async fn test_results_in_task_order() {
        let fetcher = Arc::new(TrackingFetcher::default());
        let pool = DownloadPool::new(fetcher, 4);

        let files = pool
            .run(make_tasks(10), &CancellationToken::new(), None)
            .await
            .unwrap();

        assert_eq!(files.len(), 10);
        for (i, file) in files.iter().enumerate() {
            assert_eq!(file.index, i);
            assert_eq!(file.data, Bytes::from(format!("http://test/{i}")));
        }
        assert_eq!(pool.active_handles(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_cap_respected() {
        let fetcher = Arc::new(TrackingFetcher {
            delay_ms: 5,
            ..Default::default()
        });
        let pool = DownloadPool::new(fetcher.clone(), 5);

        let files = pool
            .run(make_tasks(50), &CancellationToken::new(), None)
            .await
            .unwrap();

        assert_eq!(files.len(), 50);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 5);
        assert!(fetcher.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_progress_reported_per_completion() {
        let fetcher = Arc::new(TrackingFetcher::default());
        let pool = DownloadPool::new(fetcher, 3);
        let seen = Mutex::new(Vec::new());

        let cb = |p: &DownloadProgress| seen.lock().push((p.completed, p.total));
        pool.run(make_tasks(6), &CancellationToken::new(), Some(&cb))
            .await
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen.last(), Some(&(6, 6)));
        assert!(seen.windows(2).all(|w| w[0].0 + 1 == w[1].0));
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_outstanding() {
        let fetcher = Arc::new(TrackingFetcher {
            fail: vec!["http://test/19".to_string()],
            hang: (0..19).map(|i| format!("http://test/{i}")).collect(),
            ..Default::default()
        });
        let pool = DownloadPool::new(fetcher.clone(), 20);

        let err = pool
            .run(make_tasks(20), &CancellationToken::new(), None)
            .await
            .unwrap_err();

        match err {
            PoolError::Fetch(e) => assert_eq!(e.status(), Some(404)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(pool.active_handles(), 0);
        assert_eq!(fetcher.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fail_fast_skips_queued_tasks() {
        let fetcher = Arc::new(TrackingFetcher {
            fail: vec!["http://test/0".to_string()],
            hang: vec!["http://test/1".to_string()],
            ..Default::default()
        });
        let pool = DownloadPool::new(fetcher.clone(), 2);

        let result = pool.run(make_tasks(10), &CancellationToken::new(), None).await;

        assert!(matches!(result, Err(PoolError::Fetch(_))));
        assert_eq!(fetcher.started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_external_cancel() {
        let fetcher = Arc::new(TrackingFetcher {
            hang: (0..5).map(|i| format!("http://test/{i}")).collect(),
            ..Default::default()
        });
        let pool = Arc::new(DownloadPool::new(fetcher, 5));
        let cancel = CancellationToken::new();

        let run = {
            let pool = Arc::clone(&pool);
            let cancel = cancel.clone();
            tokio::spawn(async move { pool.run(make_tasks(5), &cancel, None).await })
        };

        while pool.active_handles() < 5 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        cancel.cancel();

        let result = run.await.unwrap();
        assert!(matches!(result, Err(PoolError::Cancelled)));
        assert_eq!(pool.active_handles(), 0);
    }

    #[tokio::test]
    async fn test_abort_all_without_tasks() {
        let pool = DownloadPool::new(Arc::new(TrackingFetcher::default()), 2);
        pool.abort_all();
        pool.abort_all();
        assert_eq!(pool.active_handles(), 0);
    }

    #[tokio::test]
    async fn test_empty_run() {
        let pool = DownloadPool::new(Arc::new(TrackingFetcher::default()), 2);
        let files = pool
            .run(Vec::new(), &CancellationToken::new(), None)
            .await
            .unwrap();
        assert!(files.is_empty());
    }
}
