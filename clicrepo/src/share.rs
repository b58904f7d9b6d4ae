//! Share links and embed snippets.
//!
//! A project can be shared as a deep link into the repository website
//! (`<site>?prj=<path>`) or embedded in another page through an `<iframe>`
//! pointing at its main file.

use reqwest::Url;

use crate::catalog::{project_base, CatalogError, CatalogResult};
use crate::project::{directory_url, Project};

/// Default embed width in pixels.
pub const DEFAULT_EMBED_WIDTH: u32 = 800;

/// Default embed height in pixels.
pub const DEFAULT_EMBED_HEIGHT: u32 = 600;

/// Size of an embedded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_EMBED_WIDTH,
            height: DEFAULT_EMBED_HEIGHT,
        }
    }
}

/// Deep link opening `path` on the repository website.
pub fn project_url(site_url: &str, path: &str) -> CatalogResult<Url> {
    let mut url = directory_url(site_url).map_err(CatalogError::InvalidUrl)?;
    url.set_query(Some(&format!("prj={}", path.trim_matches('/'))));
    Ok(url)
}

/// URL of the file the player opens first.
///
/// Uses the project's `fullPath` when known, otherwise resolves its path
/// against `base_url`.
pub fn player_url(base_url: &Url, project: &Project) -> CatalogResult<Url> {
    let base = match &project.full_path {
        Some(full_path) => directory_url(full_path).map_err(CatalogError::InvalidUrl)?,
        None => project_base(base_url, &project.path)?,
    };
    base.join(project.main_file.trim_start_matches("./"))
        .map_err(|e| CatalogError::InvalidUrl(e.to_string()))
}

/// HTML snippet embedding the player at `src`.
pub fn embed_code(src: &Url, options: &EmbedOptions) -> String {
    format!(
        r#"<iframe width="{}" height="{}" frameborder="0" allowfullscreen="true" src="{}"></iframe>"#,
        options.width, options.height, src
    )
}
