//! Cancellation handles for in-flight fetches.
//!
//! Every running fetch owns a [`FetchHandle`] registered in a shared
//! [`HandleSet`]. Dropping the handle deregisters it, so the set's length is
//! always the number of fetches that have not yet resolved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Registry of cancellation tokens for the fetches currently in flight.
#[derive(Debug, Default)]
pub struct HandleSet {
    next_id: AtomicU64,
    active: Mutex<HashMap<u64, CancellationToken>>,
}

impl HandleSet {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new handle whose token is a child of `parent`.
    ///
    /// If `parent` is already cancelled the handle starts out aborted.
    pub fn register(self: &Arc<Self>, parent: &CancellationToken) -> FetchHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = parent.child_token();
        self.active.lock().insert(id, token.clone());

        FetchHandle {
            id,
            token,
            set: Arc::clone(self),
        }
    }

    /// Number of handles that have not been dropped yet.
    pub fn active(&self) -> usize {
        self.active.lock().len()
    }

    /// Abort every registered handle.
    ///
    /// Safe to call at any time, including with no handles registered or
    /// with handles that were already aborted.
    pub fn abort_all(&self) -> usize {
        let active = self.active.lock();
        for token in active.values() {
            token.cancel();
        }
        active.len()
    }

    fn release(&self, id: u64) {
        self.active.lock().remove(&id);
    }
}

/// Cancel handle for one in-flight fetch.
#[derive(Debug)]
pub struct FetchHandle {
    id: u64,
    token: CancellationToken,
    set: Arc<HandleSet>,
}

impl FetchHandle {
    /// Abort this fetch.
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Whether this fetch has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the fetch is aborted.
    pub fn aborted(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        self.set.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_drop() {
        let set = Arc::new(HandleSet::new());
        let parent = CancellationToken::new();

        let a = set.register(&parent);
        let b = set.register(&parent);
        assert_eq!(set.active(), 2);

        drop(a);
        assert_eq!(set.active(), 1);
        drop(b);
        assert_eq!(set.active(), 0);
    }

    #[test]
    fn test_abort_all_is_idempotent() {
        let set = Arc::new(HandleSet::new());
        assert_eq!(set.abort_all(), 0);

        let parent = CancellationToken::new();
        let handle = set.register(&parent);
        handle.abort();

        assert_eq!(set.abort_all(), 1);
        assert_eq!(set.abort_all(), 1);
        assert!(handle.is_aborted());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_cancelled_parent_aborts_new_handles() {
        let set = Arc::new(HandleSet::new());
        let parent = CancellationToken::new();
        parent.cancel();

        let handle = set.register(&parent);
        assert!(handle.is_aborted());
    }

    #[tokio::test]
    async fn test_aborted_future_resolves() {
        let set = Arc::new(HandleSet::new());
        let parent = CancellationToken::new();
        let handle = set.register(&parent);

        parent.cancel();
        handle.aborted().await;
        assert!(handle.is_aborted());
    }
}
