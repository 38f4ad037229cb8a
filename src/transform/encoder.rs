//! WebP derivative codec.
//!
//! Decodes arbitrary raster sources (format sniffed from the bytes) and
//! encodes derivatives as lossy WebP.
//!
//! # Design Decisions
//!
//! - **Single output format**: every derivative is WebP, so the response
//!   `Content-Type` never depends on the source.
//!
//! - **Alpha preserved**: sources with an alpha channel are encoded as RGBA,
//!   everything else as RGB.
//!
//! - **Deterministic**: the same pixels and quality always produce the same
//!   bytes.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageReader};

use crate::error::TransformError;

/// Default encoding quality (1-100).
pub const DEFAULT_QUALITY: u8 = 90;

/// Minimum allowed quality.
pub const MIN_QUALITY: u8 = 1;

/// Maximum allowed quality.
pub const MAX_QUALITY: u8 = 100;

/// MIME type of every derivative.
pub const OUTPUT_CONTENT_TYPE: &str = "image/webp";

// =============================================================================
// WebP Encoder
// =============================================================================

/// Stateless decoder/encoder pair used by the transform engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpEncoder;

impl WebpEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode source bytes of any supported raster format.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Decode`] if the format cannot be recognized
    /// or the pixel data is malformed.
    pub fn decode(&self, source: &[u8]) -> Result<DynamicImage, TransformError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode {
                message: e.to_string(),
            })?;

        if reader.format().is_none() {
            return Err(TransformError::Decode {
                message: "unrecognized image format".to_string(),
            });
        }

        reader.decode().map_err(|e| TransformError::Decode {
            message: e.to_string(),
        })
    }

    /// Encode pixels as lossy WebP at `quality` (clamped to 1-100).
    pub fn encode(&self, img: &DynamicImage, quality: u8) -> Result<Bytes, TransformError> {
        let quality = clamp_quality(quality) as f32;
        let (width, height) = (img.width(), img.height());

        let encoded = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(false, quality)
        } else {
            let rgb = img.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
        };

        let memory = encoded.map_err(|e| TransformError::Encode {
            message: format!("{:?}", e),
        })?;

        Ok(Bytes::copy_from_slice(&memory))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_QUALITY..=MAX_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
