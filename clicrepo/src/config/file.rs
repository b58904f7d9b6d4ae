//! INI configuration file.
//!
//! ```ini
//! [repository]
//! base_url = https://projectes.xtec.cat/clic/
//! site_url = https://clic.xtec.cat/repo/
//!
//! [download]
//! concurrency = 20
//! timeout_secs = 60
//! debug = false
//! allow_local_origin = false
//!
//! [logging]
//! file =
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use crate::download::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};

/// Default repository holding `projects.json` and the project folders.
pub const DEFAULT_BASE_URL: &str = "https://projectes.xtec.cat/clic/";

/// Default public catalog page used for share links.
pub const DEFAULT_SITE_URL: &str = "https://clic.xtec.cat/repo/";

/// Application directory name under the user's config directory.
const APP_DIR: &str = "clicrepo";

/// Path of the user's configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.ini")
}

/// `[repository]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    pub base_url: String,
    pub site_url: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub debug: bool,
    pub allow_local_origin: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
            allow_local_origin: false,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Optional log file; console only when unset.
    pub file: Option<PathBuf>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub repository: RepositorySettings,
    pub download: DownloadSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load the user's configuration file.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the user's configuration file.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();
        for key in super::ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.download.concurrency, 20);
        assert!(!config.download.debug);
        assert!(!config.download.allow_local_origin);
        assert_eq!(config.repository.base_url, DEFAULT_BASE_URL);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("nope.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.ini");

        let mut config = ConfigFile::default();
        config.repository.base_url = "http://localhost:8080/repo/".to_string();
        config.download.concurrency = 5;
        config.download.debug = true;
        config.logging.file = Some(PathBuf::from("/tmp/clicrepo.log"));

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[download]\nconcurrency = 8\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.download.concurrency, 8);
        assert_eq!(config.download.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.repository, RepositorySettings::default());
    }

    #[test]
    fn test_invalid_value_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[download]\nconcurrency = many\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
