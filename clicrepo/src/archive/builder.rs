//! In-memory ZIP assembly.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::{ArchiveError, ArchiveResult};
use crate::download::percent;

/// Progress callback for the compression phase.
///
/// Runs on the compression worker thread, hence `Arc` and `'static`.
pub type CompressProgressCallback = Arc<dyn Fn(&CompressProgress) + Send + Sync>;

/// Compression progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressProgress {
    /// Whole percentage of entries written (0-100).
    pub percent: u8,
    /// Entry currently being written.
    pub current_entry: String,
}

/// A named binary entry of the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Bytes,
}

/// Accumulates entries and compresses them into a single ZIP blob.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binary entry. Names must be unique.
    pub fn add_entry(&mut self, name: impl Into<String>, data: Bytes) -> ArchiveResult<()> {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(ArchiveError::DuplicateEntry(name));
        }
        self.entries.push(ArchiveEntry { name, data });
        Ok(())
    }

    /// Add the textual manifest entry.
    pub fn add_manifest(&mut self, name: impl Into<String>, json: String) -> ArchiveResult<()> {
        self.add_entry(name, Bytes::from(json))
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in insertion order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Compress every entry into a ZIP archive.
    ///
    /// Runs on a blocking thread. `cancel` is checked between entries.
    pub async fn build(
        self,
        cancel: CancellationToken,
        on_progress: Option<CompressProgressCallback>,
    ) -> ArchiveResult<Bytes> {
        let entries = self.entries;
        info!(entries = entries.len(), "Compressing archive");

        tokio::task::spawn_blocking(move || write_zip(&entries, &cancel, on_progress.as_deref()))
            .await
            .map_err(|e| ArchiveError::Join(e.to_string()))?
    }
}

fn write_zip(
    entries: &[ArchiveEntry],
    cancel: &CancellationToken,
    on_progress: Option<&(dyn Fn(&CompressProgress) + Send + Sync)>,
) -> ArchiveResult<Bytes> {
    let total = entries.len();
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (i, entry) in entries.iter().enumerate() {
        if cancel.is_cancelled() {
            debug!(written = i, total, "Compression aborted");
            return Err(ArchiveError::Aborted);
        }

        if let Some(cb) = on_progress {
            cb(&CompressProgress {
                percent: percent(i, total),
                current_entry: entry.name.clone(),
            });
        }

        let zip_err = |reason: String| ArchiveError::Zip {
            entry: entry.name.clone(),
            reason,
        };
        zip.start_file(entry.name.as_str(), options)
            .map_err(|e| zip_err(e.to_string()))?;
        zip.write_all(&entry.data)
            .map_err(|e| zip_err(e.to_string()))?;
    }

    let cursor = zip.finish().map_err(|e| ArchiveError::Zip {
        entry: "<central directory>".to_string(),
        reason: e.to_string(),
    })?;

    if let (Some(cb), Some(last)) = (on_progress, entries.last()) {
        cb(&CompressProgress {
            percent: 100,
            current_entry: last.name.clone(),
        });
    }

    let bytes = cursor.into_inner();
    debug!(size = bytes.len(), "Archive written");
    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: &Bytes) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut builder = ArchiveBuilder::new();
        builder.add_entry("a.png", Bytes::from_static(b"1")).unwrap();
        let err = builder.add_entry("a.png", Bytes::from_static(b"2")).unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateEntry(name) if name == "a.png"));
        assert_eq!(builder.len(), 1);
    }

    #[tokio::test]
    async fn test_build_preserves_bytes_and_names() {
        let binary: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let mut builder = ArchiveBuilder::new();
        builder
            .add_entry("activity.jclic", Bytes::from_static(b"<JClicProject/>"))
            .unwrap();
        builder
            .add_entry("media/img1.png", Bytes::from(binary.clone()))
            .unwrap();
        builder
            .add_manifest("project.json", "{\n \"a\": 1\n}".to_string())
            .unwrap();

        let bytes = builder.build(CancellationToken::new(), None).await.unwrap();
        let entries = read_entries(&bytes);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "activity.jclic");
        assert_eq!(entries[0].1, b"<JClicProject/>");
        assert_eq!(entries[1].0, "media/img1.png");
        assert_eq!(entries[1].1, binary);
        assert_eq!(entries[2].0, "project.json");
        assert_eq!(entries[2].1, b"{\n \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_build_reports_progress() {
        let mut builder = ArchiveBuilder::new();
        for name in ["a", "b", "c", "d"] {
            builder.add_entry(name, Bytes::from_static(b"x")).unwrap();
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb: CompressProgressCallback = Arc::new(move |p: &CompressProgress| {
            sink.lock().push((p.percent, p.current_entry.clone()));
        });

        builder.build(CancellationToken::new(), Some(cb)).await.unwrap();

        let seen = seen.lock().clone();
        assert_eq!(
            seen,
            vec![
                (0, "a".to_string()),
                (25, "b".to_string()),
                (50, "c".to_string()),
                (75, "d".to_string()),
                (100, "d".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_build_cancelled() {
        let mut builder = ArchiveBuilder::new();
        builder.add_entry("a", Bytes::from_static(b"x")).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = builder.build(cancel, None).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Aborted));
    }

    #[tokio::test]
    async fn test_build_empty_archive() {
        let bytes = ArchiveBuilder::new()
            .build(CancellationToken::new(), None)
            .await
            .unwrap();
        assert!(read_entries(&bytes).is_empty());
    }
}
