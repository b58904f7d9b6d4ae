//! Archive building for exported projects.
//!
//! Collects the downloaded files plus the synthesized manifest and packs
//! them into a single in-memory ZIP (deflate). Compression runs on a
//! blocking thread and reports per-entry progress.

mod builder;
mod error;

pub use builder::{ArchiveBuilder, ArchiveEntry, CompressProgress, CompressProgressCallback};
pub use error::{ArchiveError, ArchiveResult};
