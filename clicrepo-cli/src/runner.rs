//! Shared setup for commands that talk to the repository.

use std::future::Future;
use std::sync::Arc;

use clicrepo::config::ConfigFile;
use clicrepo::project::directory_url;
use clicrepo::{init_logging, DownloadConfig, HttpFetcher, LoggingGuard, LoggingOptions, Url};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::CliError;

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub verbose: u8,
    pub base_url: Option<String>,
    pub site_url: Option<String>,
}

/// Loaded configuration, logging and an async runtime.
pub struct CliRunner {
    config: ConfigFile,
    base_url: String,
    site_url: String,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load the configuration file, install logging and start the runtime.
    pub fn new(args: &GlobalArgs) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging = init_logging(&LoggingOptions {
            verbosity: args.verbose,
            file: config.logging.file.clone(),
        })?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        let base_url = args
            .base_url
            .clone()
            .unwrap_or_else(|| config.repository.base_url.clone());
        let site_url = args
            .site_url
            .clone()
            .unwrap_or_else(|| config.repository.site_url.clone());

        Ok(Self {
            config,
            base_url,
            site_url,
            runtime,
            _logging: logging,
        })
    }

    /// Repository base URL, command line first.
    pub fn base_url(&self) -> Result<Url, CliError> {
        directory_url(&self.base_url).map_err(CliError::Config)
    }

    /// Repository website URL, command line first.
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Download settings from the configuration file.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig::from_config_file(&self.config)
    }

    /// HTTP fetcher honouring the configured timeout and local access flag.
    pub fn fetcher(&self, config: &DownloadConfig) -> Result<Arc<HttpFetcher>, CliError> {
        let fetcher = HttpFetcher::with_timeout(config.timeout)?
            .allow_local_origin(config.allow_local_origin);
        Ok(Arc::new(fetcher))
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn log_startup(&self, command: &str) {
        debug!(
            command,
            base_url = %self.base_url,
            version = env!("CARGO_PKG_VERSION"),
            "clicrepo starting"
        );
    }
}
