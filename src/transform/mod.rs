//! Derivative transform layer.
//!
//! This module turns a source image URL and a requested shape into encoded
//! WebP bytes.
//!
//! # Components
//!
//! - [`TransformEngine`]: entry point, orchestrates fetch and the pixel pipeline
//! - [`DerivativeRequest`]: validated parameters for one derivative
//! - [`Geometry`] / [`ResizeMode`]: pure sizing decisions (cover vs contain,
//!   no upscaling)
//! - [`WebpEncoder`]: sniffing decoder and lossy WebP encoder
//!
//! # Example
//!
//! ```
//! use image_derivatives::transform::{Geometry, ResizeMode};
//!
//! // A wide source fitted into a square keeps its aspect ratio
//! let geometry = Geometry::compute((1600, 900), (800, 800), ResizeMode::Contain);
//! assert_eq!((geometry.target_width, geometry.target_height), (800, 450));
//!
//! // Cropping fills the box exactly
//! let geometry = Geometry::compute((1600, 900), (800, 800), ResizeMode::Cover);
//! assert_eq!((geometry.target_width, geometry.target_height), (800, 800));
//! ```

mod encoder;
mod engine;
mod geometry;

pub use encoder::{
    clamp_quality, is_valid_quality, WebpEncoder, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
    OUTPUT_CONTENT_TYPE,
};
pub use engine::{render_derivative, Derivative, DerivativeRequest, TransformEngine};
pub use geometry::{clamp_box_to_source, fit_within, Geometry, ResizeMode, MAX_OUTPUT_DIMENSION};
