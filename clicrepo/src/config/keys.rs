//! Configuration keys addressable as `section.key`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;

/// A configuration setting that can be read or written by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    RepositoryBaseUrl,
    RepositorySiteUrl,
    DownloadConcurrency,
    DownloadTimeoutSecs,
    DownloadDebug,
    DownloadAllowLocalOrigin,
    LoggingFile,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::RepositoryBaseUrl,
            ConfigKey::RepositorySiteUrl,
            ConfigKey::DownloadConcurrency,
            ConfigKey::DownloadTimeoutSecs,
            ConfigKey::DownloadDebug,
            ConfigKey::DownloadAllowLocalOrigin,
            ConfigKey::LoggingFile,
        ]
    }

    /// INI section holding this key.
    pub fn section(&self) -> &'static str {
        match self {
            Self::RepositoryBaseUrl | Self::RepositorySiteUrl => "repository",
            Self::DownloadConcurrency
            | Self::DownloadTimeoutSecs
            | Self::DownloadDebug
            | Self::DownloadAllowLocalOrigin => "download",
            Self::LoggingFile => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::RepositoryBaseUrl => "base_url",
            Self::RepositorySiteUrl => "site_url",
            Self::DownloadConcurrency => "concurrency",
            Self::DownloadTimeoutSecs => "timeout_secs",
            Self::DownloadDebug => "debug",
            Self::DownloadAllowLocalOrigin => "allow_local_origin",
            Self::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as a string (empty when unset).
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::RepositoryBaseUrl => config.repository.base_url.clone(),
            Self::RepositorySiteUrl => config.repository.site_url.clone(),
            Self::DownloadConcurrency => config.download.concurrency.to_string(),
            Self::DownloadTimeoutSecs => config.download.timeout_secs.to_string(),
            Self::DownloadDebug => config.download.debug.to_string(),
            Self::DownloadAllowLocalOrigin => config.download.allow_local_origin.to_string(),
            Self::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        match self {
            Self::RepositoryBaseUrl => config.repository.base_url = self.parse_url(value)?,
            Self::RepositorySiteUrl => config.repository.site_url = self.parse_url(value)?,
            Self::DownloadConcurrency => {
                let n: usize = self.parse(value)?;
                if n == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.download.concurrency = n;
            }
            Self::DownloadTimeoutSecs => config.download.timeout_secs = self.parse(value)?,
            Self::DownloadDebug => config.download.debug = self.parse_bool(value)?,
            Self::DownloadAllowLocalOrigin => {
                config.download.allow_local_origin = self.parse_bool(value)?
            }
            Self::LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }
        Ok(())
    }

    fn parse<T>(&self, value: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(value, &e.to_string()))
    }

    fn parse_bool(&self, value: &str) -> ConfigResult<bool> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn parse_url(&self, value: &str) -> ConfigResult<String> {
        reqwest::Url::parse(value)
            .map(|_| value.to_string())
            .map_err(|e| self.invalid(value, &e.to_string()))
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert!(matches!(
            "download.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();

        ConfigKey::DownloadConcurrency.set(&mut config, "7").unwrap();
        ConfigKey::DownloadDebug.set(&mut config, "yes").unwrap();
        ConfigKey::LoggingFile.set(&mut config, "/tmp/x.log").unwrap();

        assert_eq!(ConfigKey::DownloadConcurrency.get(&config), "7");
        assert_eq!(ConfigKey::DownloadDebug.get(&config), "true");
        assert_eq!(ConfigKey::LoggingFile.get(&config), "/tmp/x.log");

        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = ConfigFile::default();
        let err = ConfigKey::DownloadConcurrency
            .set(&mut config, "0")
            .unwrap_err();
        assert!(err.to_string().contains("download.concurrency"));
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::RepositoryBaseUrl
            .set(&mut config, "not a url")
            .is_err());
    }

    #[test]
    fn test_sections_are_contiguous() {
        let sections: Vec<_> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut seen = Vec::new();
        for s in sections {
            if seen.last() != Some(&s) {
                assert!(!seen.contains(&s), "section {s} split");
                seen.push(s);
            }
        }
    }
}
