//! Transform engine: fetch, decode, size, resize, encode.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       TransformEngine                           │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    transform()                          │    │
//! │  │  1. Fetch source (async)   4. Resize (cover/contain)    │    │
//! │  │  2. Decode                 5. Encode WebP at quality    │    │
//! │  │  3. Compute geometry       6. Return bytes              │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                               │                     │
//! │           ▼                               ▼                     │
//! │    ┌───────────────┐            ┌──────────────────────┐        │
//! │    │ SourceFetcher │            │ WebpEncoder          │        │
//! │    └───────────────┘            │ (blocking pool)      │        │
//! │                                 └──────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached here. Repeat work is avoided by the HTTP cache in front
//! of the endpoint.

use std::sync::Arc;

use bytes::Bytes;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::error::TransformError;
use crate::fetch::SourceFetcher;

use super::encoder::{clamp_quality, WebpEncoder, DEFAULT_QUALITY};
use super::geometry::{Geometry, ResizeMode};

// =============================================================================
// Derivative Request
// =============================================================================

/// A validated request for one derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeRequest {
    /// URL of the source image
    pub source_url: String,

    /// Requested width in pixels (non-zero)
    pub width: u32,

    /// Requested height in pixels (non-zero)
    pub height: u32,

    /// Encoding quality (1-100)
    pub quality: u8,

    /// `true` to fill and crop, `false` to fit
    pub crop: bool,
}

impl DerivativeRequest {
    /// Create a cropping request with the default quality.
    pub fn new(source_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source_url: source_url.into(),
            width,
            height,
            quality: DEFAULT_QUALITY,
            crop: true,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = clamp_quality(quality);
        self
    }

    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    pub fn mode(&self) -> ResizeMode {
        ResizeMode::from_crop(self.crop)
    }
}

/// An encoded derivative and how it was sized.
#[derive(Debug, Clone)]
pub struct Derivative {
    /// The encoded WebP bytes
    pub data: Bytes,

    /// Geometry used to produce the output
    pub geometry: Geometry,

    /// Quality used for encoding
    pub quality: u8,
}

// =============================================================================
// Transform Engine
// =============================================================================

/// Produces derivatives from remote sources.
///
/// # Type Parameters
///
/// * `F` - The source fetcher (e.g., [`crate::fetch::HttpFetcher`])
pub struct TransformEngine<F: SourceFetcher> {
    fetcher: Arc<F>,
    encoder: WebpEncoder,
}

impl<F: SourceFetcher> TransformEngine<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            encoder: WebpEncoder::new(),
        }
    }

    /// Produce the derivative described by `request`.
    ///
    /// The fetch is awaited first; decoding, resizing and encoding then run
    /// on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// - [`TransformError::Fetch`] if the source cannot be retrieved
    /// - [`TransformError::Decode`] if the bytes are not a supported image
    /// - [`TransformError::Encode`] if WebP encoding fails
    pub async fn transform(&self, request: &DerivativeRequest) -> Result<Derivative, TransformError> {
        let source = self.fetcher.fetch(&request.source_url).await?;

        let encoder = self.encoder;
        let requested = (request.width, request.height);
        let mode = request.mode();
        let quality = clamp_quality(request.quality);

        let derivative = tokio::task::spawn_blocking(move || {
            render_derivative(&encoder, &source, requested, mode, quality)
        })
        .await
        .map_err(|e| TransformError::Worker {
            message: e.to_string(),
        })??;

        debug!(
            source = %request.source_url,
            source_width = derivative.geometry.source_width,
            source_height = derivative.geometry.source_height,
            width = derivative.geometry.target_width,
            height = derivative.geometry.target_height,
            mode = derivative.geometry.mode.as_str(),
            quality = derivative.quality,
            bytes = derivative.data.len(),
            "Rendered derivative"
        );

        Ok(derivative)
    }
}

/// Synchronous pixel pipeline: decode, size, resize, encode.
pub fn render_derivative(
    encoder: &WebpEncoder,
    source: &[u8],
    requested: (u32, u32),
    mode: ResizeMode,
    quality: u8,
) -> Result<Derivative, TransformError> {
    let img = encoder.decode(source)?;
    let geometry = Geometry::compute((img.width(), img.height()), requested, mode);
    let resized = resize(img, &geometry);
    let data = encoder.encode(&resized, quality)?;

    Ok(Derivative {
        data,
        geometry,
        quality,
    })
}

fn resize(img: DynamicImage, geometry: &Geometry) -> DynamicImage {
    if geometry.is_identity() {
        return img;
    }

    let (width, height) = (geometry.target_width, geometry.target_height);
    match geometry.mode {
        // Scales to cover the box, then crops the overflow around the centre
        ResizeMode::Cover => img.resize_to_fill(width, height, FilterType::Lanczos3),
        // Target already has the source aspect ratio, so no padding is needed
        ResizeMode::Contain => img.resize_exact(width, height, FilterType::Lanczos3),
    }
}

// =============================================================================
// Tests
// =============================================================================
