//! Concurrent file downloads for project export.
//!
//! This module provides the download half of the export pipeline:
//! - Single-file binary fetches over HTTP or local files (`fetch`)
//! - Cancellation handles for in-flight fetches (`handles`)
//! - Download tasks built from a project manifest (`task`)
//! - Per-completion progress reporting (`progress`)
//! - The bounded, fail-fast download pool (`pool`)
//!
//! # Architecture
//!
//! ```text
//! DownloadPool
//!         │
//!         ├── BinaryFetcher (trait)
//!         │       └── HttpFetcher
//!         │
//!         ├── HandleSet (one FetchHandle per in-flight fetch)
//!         │
//!         └── DownloadProgress (reported after each completion)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use clicrepo::download::{DownloadPool, HttpFetcher};
//!
//! let pool = DownloadPool::new(Arc::new(HttpFetcher::new()?), 20);
//! let files = pool.run(tasks, &CancellationToken::new(), Some(&|p| {
//!     println!("{}/{} {}", p.completed, p.total, p.last_entry);
//! })).await?;
//! ```

mod error;
mod fetch;
mod handles;
mod pool;
mod progress;
mod task;

pub use error::{FetchError, FetchResult, PoolError};
pub use fetch::{BinaryFetcher, FetchFuture, HttpFetcher, DEFAULT_TIMEOUT_SECS};
pub use handles::{FetchHandle, HandleSet};
pub use pool::{DownloadPool, DEFAULT_CONCURRENCY};
pub use progress::{percent, DownloadProgress, DownloadProgressFn};
pub use task::{tasks_for_project, DownloadTask, DownloadedFile};

#[cfg(test)]
pub(crate) use fetch::tests::MapFetcher;
