//! Repository catalog.
//!
//! The repository publishes an index of every project (`projects.json`) at
//! its base URL and one `project.json` manifest per project directory. The
//! catalog loads the index once and answers filter, sort and page queries
//! locally; full manifests are fetched on demand.
//!
//! # Example
//!
//! ```ignore
//! use clicrepo::catalog::{paginate, Catalog, ProjectFilter, SortKey, SortOrder};
//!
//! let catalog = Catalog::load(&fetcher, "https://projectes.xtec.cat/clic/").await?;
//! let hits = catalog.query(&ProjectFilter::new().with_language("ca"), SortKey::Date, SortOrder::Descending);
//! let first = paginate(&hits, 1, 20);
//! let project = catalog.load_project(&fetcher, &first.items[0].path).await?;
//! ```

mod error;
mod filter;
mod page;
mod summary;

pub use error::{CatalogError, CatalogResult};
pub use filter::{parse_date, sort_projects, ProjectFilter, SortKey, SortOrder};
pub use page::{paginate, Page};
pub use summary::ProjectSummary;

use std::collections::BTreeMap;

use reqwest::Url;
use tracing::{debug, info};

use crate::download::BinaryFetcher;
use crate::project::{directory_url, Project, MANIFEST_FILE};

/// File name of the repository index.
pub const INDEX_FILE: &str = "projects.json";

/// Distinct codes present in the catalog, with project counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub languages: BTreeMap<String, usize>,
    pub levels: BTreeMap<String, usize>,
    pub areas: BTreeMap<String, usize>,
}

/// The loaded repository index.
#[derive(Debug, Clone)]
pub struct Catalog {
    base_url: Url,
    projects: Vec<ProjectSummary>,
}

impl Catalog {
    /// Fetch and parse `<base_url>/projects.json`.
    pub async fn load(fetcher: &dyn BinaryFetcher, base_url: &str) -> CatalogResult<Self> {
        let base_url = directory_url(base_url).map_err(CatalogError::InvalidUrl)?;
        let index_url = base_url
            .join(INDEX_FILE)
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        debug!(url = %index_url, "Loading catalog index");
        let body = fetcher
            .fetch(index_url.as_str())
            .await
            .map_err(|source| CatalogError::Fetch {
                what: "catalog index".to_string(),
                source,
            })?;

        let projects: Vec<ProjectSummary> =
            serde_json::from_slice(&body).map_err(|source| CatalogError::Parse {
                what: "catalog index".to_string(),
                source,
            })?;

        info!(projects = projects.len(), base = %base_url, "Catalog loaded");
        Ok(Self::from_projects(base_url, projects))
    }

    /// Build a catalog from already parsed entries.
    pub fn from_projects(base_url: Url, projects: Vec<ProjectSummary>) -> Self {
        Self { base_url, projects }
    }

    /// Repository base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Every entry, in index order.
    pub fn projects(&self) -> &[ProjectSummary] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Look up an entry by its repository path.
    pub fn find(&self, path: &str) -> Option<&ProjectSummary> {
        let path = path.trim_matches('/');
        self.projects.iter().find(|p| p.path.trim_matches('/') == path)
    }

    /// Entries matching `filter`, sorted.
    pub fn query(
        &self,
        filter: &ProjectFilter,
        key: SortKey,
        order: SortOrder,
    ) -> Vec<&ProjectSummary> {
        let mut hits: Vec<&ProjectSummary> =
            self.projects.iter().filter(|p| filter.matches(p)).collect();
        sort_projects(&mut hits, key, order);
        hits
    }

    /// Languages, levels and areas with the number of projects using each.
    pub fn facets(&self) -> Facets {
        let mut facets = Facets::default();
        for project in &self.projects {
            for code in &project.lang_codes {
                *facets.languages.entry(code.clone()).or_default() += 1;
            }
            for code in &project.level_codes {
                *facets.levels.entry(code.clone()).or_default() += 1;
            }
            for code in &project.area_codes {
                *facets.areas.entry(code.clone()).or_default() += 1;
            }
        }
        facets
    }

    /// Absolute base URL of the project at `path`.
    pub fn project_base(&self, path: &str) -> CatalogResult<Url> {
        project_base(&self.base_url, path)
    }

    /// Fetch the full manifest of the project at `path`.
    pub async fn load_project(
        &self,
        fetcher: &dyn BinaryFetcher,
        path: &str,
    ) -> CatalogResult<Project> {
        load_project(fetcher, &self.base_url, path).await
    }
}

/// Absolute base URL of the project at `path` under `base_url`.
pub fn project_base(base_url: &Url, path: &str) -> CatalogResult<Url> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Err(CatalogError::InvalidUrl("empty project path".to_string()));
    }
    base_url
        .join(&format!("{}/", path))
        .map_err(|e| CatalogError::InvalidUrl(e.to_string()))
}

/// Fetch `<base_url>/<path>/project.json` and fill in `path` and `fullPath`.
pub async fn load_project(
    fetcher: &dyn BinaryFetcher,
    base_url: &Url,
    path: &str,
) -> CatalogResult<Project> {
    let base = project_base(base_url, path)?;
    let manifest_url = base
        .join(MANIFEST_FILE)
        .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

    debug!(url = %manifest_url, "Loading project manifest");
    let body = fetcher
        .fetch(manifest_url.as_str())
        .await
        .map_err(|source| match source.status() {
            Some(404) => CatalogError::NotFound(path.to_string()),
            _ => CatalogError::Fetch {
                what: format!("manifest of '{}'", path),
                source,
            },
        })?;

    let mut project = Project::from_slice(&body).map_err(|source| CatalogError::Parse {
        what: format!("manifest of '{}'", path),
        source,
    })?;
    project.path = path.trim_matches('/').to_string();
    project.full_path = Some(base.to_string());
    Ok(project)
}
