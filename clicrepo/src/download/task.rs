//! Download tasks and their results.

use bytes::Bytes;
use reqwest::Url;

use crate::project::{PathRewrite, Project};

/// One file to fetch and the name it will take inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Position in the project's file list; results are ordered by it.
    pub index: usize,
    /// Absolute URL to fetch.
    pub url: String,
    /// Project-relative path as listed in the manifest.
    pub source_path: String,
    /// Entry name after path rewriting.
    pub entry_name: String,
}

/// A successfully fetched file.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub index: usize,
    pub entry_name: String,
    pub data: Bytes,
}

/// Build one task per content file of `project`, resolved against `base`.
///
/// The manifest itself is skipped; it is synthesized locally.
pub fn tasks_for_project(
    project: &Project,
    base: &Url,
    rewrite: &PathRewrite,
) -> Result<Vec<DownloadTask>, String> {
    project
        .content_files()
        .enumerate()
        .map(|(index, file)| {
            let url = base
                .join(file)
                .map_err(|e| format!("cannot resolve '{}': {}", file, e))?;
            Ok(DownloadTask {
                index,
                url: url.to_string(),
                source_path: file.to_string(),
                entry_name: rewrite.entry_name(file).into_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_for_project() {
        let project = Project::from_json(
            r#"{
                "path": "p1",
                "mainFile": "jclic.js/activity.jclic",
                "files": ["jclic.js/activity.jclic", "jclic.js/img1.png", "project.json"]
            }"#,
        )
        .unwrap();
        let base = Url::parse("https://example.com/repo/p1/").unwrap();
        let rewrite = project.path_rewrite().unwrap();

        let tasks = tasks_for_project(&project, &base, &rewrite).unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(
            tasks[0].url,
            "https://example.com/repo/p1/jclic.js/activity.jclic"
        );
        assert_eq!(tasks[0].entry_name, "activity.jclic");
        assert_eq!(tasks[1].index, 1);
        assert_eq!(tasks[1].entry_name, "img1.png");
        assert_eq!(tasks[1].source_path, "jclic.js/img1.png");
    }
}
