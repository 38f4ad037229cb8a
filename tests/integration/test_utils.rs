//! Test utilities for integration tests.
//!
//! This module provides a mock source fetcher that counts calls and helpers
//! for building source images and driving the router.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use image_derivatives::error::FetchError;
use image_derivatives::fetch::SourceFetcher;
use image_derivatives::server::{create_router, RouterConfig};
use image_derivatives::style::StyleRegistry;
use image_derivatives::transform::TransformEngine;

// =============================================================================
// Mock Source Fetcher
// =============================================================================

/// A fetcher that serves pre-configured sources and counts every call.
///
/// Unknown URLs fail with a 404 status error.
#[derive(Clone, Default)]
pub struct MockFetcher {
    sources: Arc<HashMap<String, Bytes>>,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, url: impl Into<String>, data: Vec<u8>) -> Self {
        let mut sources = (*self.sources).clone();
        sources.insert(url.into(), Bytes::from(data));
        Self {
            sources: Arc::new(sources),
            calls: self.calls,
        }
    }

    /// Shared handle to the call counter, usable after the fetcher is moved.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Router over `fetcher` with the built-in styles.
pub fn test_router(fetcher: MockFetcher) -> Router {
    test_router_with_styles(fetcher, StyleRegistry::builtin())
}

pub fn test_router_with_styles(fetcher: MockFetcher, styles: StyleRegistry) -> Router {
    create_router(
        TransformEngine::new(fetcher),
        Arc::new(styles),
        RouterConfig::new().with_tracing(false),
    )
}

/// Send a GET request and return the response.
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// =============================================================================
// Image Helpers
// =============================================================================

/// Encode an RGB gradient as JPEG.
pub fn create_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Encode a half-transparent RGBA image as PNG.
pub fn create_rgba_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| Rgba([0, 128, 255, (x % 256) as u8]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Decode a WebP body and return its dimensions.
pub fn webp_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(data, ImageFormat::WebP)
        .expect("response should be a valid WebP image");
    (img.width(), img.height())
}

/// Check for the RIFF/WEBP container signature.
pub fn is_valid_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// Build an `/api/image` query with `url` percent-encoded.
pub fn image_uri(source: &str, rest: &str) -> String {
    let mut uri = format!("/api/image?url={}", urlencoding::encode(source));
    if !rest.is_empty() {
        uri.push('&');
        uri.push_str(rest);
    }
    uri
}
