//! Source image fetching.
//!
//! The transform engine never talks to the network directly; it goes through
//! a [`SourceFetcher`]. Production uses [`HttpFetcher`], tests substitute an
//! in-memory fetcher that can count calls.

mod client;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

pub use client::{HttpFetcher, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_SOURCE_BYTES};

/// Trait for loading a whole source image into memory.
///
/// Implementations must be thread-safe; one fetcher is shared by every
/// in-flight request. Implementations do not retry.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the complete body behind `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
