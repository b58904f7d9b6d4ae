//! Catalog error types.

use thiserror::Error;

use crate::download::FetchError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from loading or querying the project catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The index or a manifest could not be downloaded.
    #[error("failed to fetch {what}: {source}")]
    Fetch {
        what: String,
        #[source]
        source: FetchError,
    },

    /// The index or a manifest is not valid JSON of the expected shape.
    #[error("invalid {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A repository or project URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// No project with the given path.
    #[error("project not found: {0}")]
    NotFound(String),
}
