//! Configuration for download sessions.

use std::time::Duration;

use super::file::ConfigFile;
use crate::download::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};

/// Configuration for a [`DownloadSession`](crate::session::DownloadSession).
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum concurrent fetches.
    pub concurrency: usize,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Log the pool size when a session starts.
    pub debug: bool,

    /// Serve `file://` URLs from the local filesystem.
    pub allow_local_origin: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
            allow_local_origin: false,
        }
    }
}

impl DownloadConfig {
    /// Build from the `[download]` section of a configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            concurrency: config.download.concurrency.max(1),
            timeout: Duration::from_secs(config.download.timeout_secs),
            debug: config.download.debug,
            allow_local_origin: config.download.allow_local_origin,
        }
    }

    /// Set the maximum concurrent fetches.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable debug logging of the pool size.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable local file access.
    pub fn with_allow_local_origin(mut self, allow: bool) -> Self {
        self.allow_local_origin = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!config.debug);
        assert!(!config.allow_local_origin);
    }

    #[test]
    fn test_builder_pattern() {
        let config = DownloadConfig::default()
            .with_concurrency(0)
            .with_timeout(Duration::from_secs(5))
            .with_debug(true)
            .with_allow_local_origin(true);

        assert_eq!(config.concurrency, 1);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.debug);
        assert!(config.allow_local_origin);
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.download.concurrency = 3;
        file.download.timeout_secs = 10;
        file.download.debug = true;

        let config = DownloadConfig::from_config_file(&file);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.debug);
    }
}
