//! clicrepo - Catalog access and offline packaging for activity repositories
//!
//! This library provides the core functionality for browsing a repository of
//! educational activity packages ("projects") and exporting any of them as a
//! self-contained SCORM ZIP archive.
//!
//! # Architecture
//!
//! ```text
//! DownloadSession (state machine)
//!         │
//!         ├── DownloadPool ──► BinaryFetcher (HttpFetcher / mocks)
//!         │
//!         ├── ArchiveBuilder (ZIP assembly on a blocking thread)
//!         │
//!         └── Project + PathRewrite (manifest normalization)
//! ```
//!
//! The [`catalog`] and [`share`] modules cover the repository index and the
//! links that point back into it.

pub mod archive;
pub mod catalog;
pub mod config;
pub mod download;
pub mod logging;
pub mod project;
pub mod session;
pub mod share;

pub use archive::{ArchiveBuilder, ArchiveError};
pub use catalog::{
    paginate, Catalog, CatalogError, Page, ProjectFilter, ProjectSummary, SortKey, SortOrder,
};
pub use config::{ConfigFile, DownloadConfig};
pub use download::{BinaryFetcher, DownloadPool, FetchError, HttpFetcher};
pub use logging::{init_logging, LoggingGuard, LoggingOptions};
pub use project::{PathRewrite, Project, MANIFEST_FILE};
pub use session::{Artifact, DownloadSession, SessionError, SessionState, SessionStatus};
pub use share::EmbedOptions;

pub use reqwest::Url;
