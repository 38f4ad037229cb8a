//! reqwest-backed source fetcher.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

use super::SourceFetcher;

/// Default per-request timeout for source fetches, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default maximum source body size (25 MiB).
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 25 * 1024 * 1024;

/// Fetches source images over HTTP(S).
///
/// The whole body is buffered in memory. Bodies larger than `max_bytes` are
/// rejected, both up front from `Content-Length` and while streaming for
/// responses that do not declare one.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and body size limit.
    pub fn new(timeout: Duration, max_bytes: u64) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client, max_bytes })
    }

    /// Create a fetcher with the default timeout and size limit.
    pub fn with_defaults() -> reqwest::Result<Self> {
        Self::new(
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            DEFAULT_MAX_SOURCE_BYTES,
        )
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn too_large(&self, url: &str) -> FetchError {
        FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        }
    }
}

/// Parse `raw` and accept only absolute http(s) URLs.
fn parse_source_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidUrl {
        url: raw.to_string(),
    };

    let url = Url::parse(raw).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

fn request_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = parse_source_url(url)?;

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let declared = response.content_length();
        if declared.is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large(url));
        }

        let capacity = declared.unwrap_or(0).min(self.max_bytes) as usize;
        let mut body = BytesMut::with_capacity(capacity);

        while let Some(chunk) = response.chunk().await.map_err(|e| request_error(url, e))? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(source = url, bytes = body.len(), "Fetched source image");

        Ok(body.freeze())
    }
}
