//! The exported archive.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

/// A finished SCORM archive and its suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name (`<project>.scorm.zip`).
    pub file_name: String,
    /// ZIP contents.
    pub data: Bytes,
    /// Number of entries in the archive, manifest included.
    pub entries: usize,
}

impl Artifact {
    /// Create an artifact.
    pub fn new(file_name: impl Into<String>, data: Bytes, entries: usize) -> Self {
        Self {
            file_name: file_name.into(),
            data,
            entries,
        }
    }

    /// Size of the archive in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the archive into `dir` under its suggested name.
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.data)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::new("p1.scorm.zip", Bytes::from_static(b"PK\x03\x04"), 1);

        let path = artifact.save_to(&dir.path().join("out")).unwrap();

        assert_eq!(path.file_name().unwrap(), "p1.scorm.zip");
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04");
        assert_eq!(artifact.len(), 4);
    }
}
