//! Configuration: the INI file, its keys, and derived runtime settings.

mod download;
mod error;
mod file;
mod keys;

pub use download::DownloadConfig;
pub use error::{ConfigError, ConfigResult};
pub use file::{
    config_file_path, ConfigFile, DownloadSettings, LoggingSettings, RepositorySettings,
    DEFAULT_BASE_URL, DEFAULT_SITE_URL,
};
pub use keys::ConfigKey;
