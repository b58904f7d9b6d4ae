//! Binary fetchers.
//!
//! A fetcher retrieves one resource as raw bytes. Aborting is done by the
//! caller: dropping the returned future stops the transfer, and the pool
//! races every fetch against its cancellation handle so an aborted fetch
//! never reports success.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::trace;

use super::error::{FetchError, FetchResult};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Boxed future returned by [`BinaryFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = FetchResult<Bytes>> + Send + 'a>>;

/// Retrieves one remote resource as an untransformed binary payload.
///
/// Uses `Pin<Box<dyn Future>>` so the pool can hold any implementation as a
/// trait object (HTTP in production, in-memory mocks in tests).
pub trait BinaryFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

/// HTTP fetcher backed by reqwest.
///
/// `file://` URLs are only honoured when local origin access is enabled.
/// This mirrors the status-0 success browsers report for local files and is
/// off by default.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    allow_local_origin: bool,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> FetchResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            allow_local_origin: false,
        })
    }

    /// Allow or forbid reading `file://` URLs from the local filesystem.
    pub fn allow_local_origin(mut self, allow: bool) -> Self {
        self.allow_local_origin = allow;
        self
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_url(&self, url: &str) -> FetchResult<Bytes> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "file" if self.allow_local_origin => fetch_local(url, &parsed).await,
            "file" => Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: "local origin access is disabled".to_string(),
            }),
            other => Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    async fn fetch_http(&self, url: &str) -> FetchResult<Bytes> {
        trace!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

async fn fetch_local(url: &str, parsed: &Url) -> FetchResult<Bytes> {
    let path: PathBuf = parsed.to_file_path().map_err(|_| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: "not a local file path".to_string(),
    })?;

    trace!(path = %path.display(), "Reading local file");

    tokio::fs::read(&path)
        .await
        .map(Bytes::from)
        .map_err(|source| FetchError::Local {
            url: url.to_string(),
            source,
        })
}

impl BinaryFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.fetch_url(url))
    }
}
