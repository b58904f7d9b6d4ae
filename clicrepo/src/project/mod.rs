//! Project manifests.
//!
//! A project is described by its `project.json`: where it lives, which file
//! the player opens first, the full list of files, and free-form descriptive
//! metadata. The metadata is kept as an ordered JSON map so an exported
//! manifest carries everything the repository published.

mod rewrite;

pub use rewrite::PathRewrite;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// File name of the manifest inside a project and inside exported archives.
pub const MANIFEST_FILE: &str = "project.json";

/// Suffix appended to the project name to build the archive file name.
pub const ARTIFACT_SUFFIX: &str = ".scorm.zip";

/// Keys that only make sense inside a running catalog and never get exported.
const INTERNAL_FIELDS: &[&str] = &[
    "fullPath",
    "normTitle",
    "normAuthor",
    "normDescription",
    "sortDate",
];

/// One activity package as described by its manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Repository-relative path of the project (e.g. `lang/english/p1`).
    #[serde(default)]
    pub path: String,

    /// Absolute base URL of the project, filled in by the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,

    /// File the player opens first, relative to the project base.
    pub main_file: String,

    /// Every file of the project, including the manifest itself.
    #[serde(default)]
    pub files: Vec<String>,

    /// Descriptive metadata (title, author, dates, languages, ...).
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Project {
    /// Parse a `project.json` document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a `project.json` document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Title from the metadata, if any.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }

    /// Author from the metadata, if any.
    pub fn author(&self) -> Option<&str> {
        self.metadata.get("author").and_then(Value::as_str)
    }

    /// Files that must be fetched: everything except the manifest.
    pub fn content_files(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .map(String::as_str)
            .filter(|f| *f != MANIFEST_FILE)
    }

    /// Last segment of the project path.
    pub fn name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("project")
    }

    /// File name for the exported archive (`<name>.scorm.zip`).
    pub fn artifact_name(&self) -> String {
        format!("{}{}", self.name(), ARTIFACT_SUFFIX)
    }

    /// Path rewrite rule derived from the main file.
    pub fn path_rewrite(&self) -> Result<PathRewrite, regex::Error> {
        PathRewrite::from_main_file(&self.main_file)
    }

    /// Manifest JSON as embedded in an exported archive.
    ///
    /// Internal fields are dropped, the rewrite is applied to every string
    /// value and the document is pretty-printed with a single space of
    /// indentation.
    pub fn normalized_manifest(&self, rewrite: &PathRewrite) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            strip_internal_fields(map);
        }
        rewrite.apply_json(&mut value);

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;

        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Parse `url` as a directory URL, adding the trailing slash if missing.
///
/// Relative file paths joined onto the result land inside the directory
/// instead of replacing its last segment.
pub fn directory_url(url: &str) -> Result<Url, String> {
    let trimmed = url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash).map_err(|e| format!("invalid URL '{}': {}", trimmed, e))
}

fn strip_internal_fields(map: &mut Map<String, Value>) {
    map.retain(|key, _| !key.starts_with('_') && !INTERNAL_FIELDS.contains(&key.as_str()));
}
