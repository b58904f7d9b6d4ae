//! Logging setup.
//!
//! Installs a `tracing` subscriber writing human-readable lines to stderr
//! and, optionally, plain lines to a log file through a non-blocking
//! writer. The returned [`LoggingGuard`] must be kept alive for the file
//! writer to flush.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors from logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log file path: {0}")]
    InvalidPath(PathBuf),

    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("logging already initialized: {0}")]
    Init(String),
}

/// Logging options.
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// 0 = warnings, 1 = info, 2 = debug, 3+ = trace.
    pub verbosity: u8,
    /// Additional log file.
    pub file: Option<PathBuf>,
}

/// Keeps the file writer alive.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Default filter directive for a verbosity level.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,clicrepo=info",
        2 => "info,clicrepo=debug",
        _ => "debug,clicrepo=trace",
    }
}

/// Build the filter. `RUST_LOG` wins unless `-v` was given.
pub fn build_filter(verbosity: u8, rust_log: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directives = match rust_log {
        Some(env) if verbosity == 0 && !env.trim().is_empty() => env,
        _ => default_directive(verbosity),
    };
    EnvFilter::try_new(directives).map_err(|e| LoggingError::Filter(e.to_string()))
}

/// Install the global subscriber.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, LoggingError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(options.verbosity, rust_log.as_deref())?;

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(options.verbosity >= 2)
        .without_time();

    let (file_layer, guard) = match &options.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
