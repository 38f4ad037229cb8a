//! # Image Derivatives
//!
//! An on-demand image derivative service.
//!
//! Given a reference to a source image and a requested output shape (width,
//! height, quality, crop policy, or a named style), the service fetches the
//! source, resizes it, and re-encodes it as WebP. Every derivative URL fully
//! describes its output, so responses are served with a one-year `immutable`
//! cache directive and all caching is left to browsers and CDNs.
//!
//! ## Architecture
//!
//! - [`style`] - Named style catalog (width, height, quality, crop policy)
//! - [`url_builder`] - Builds derivative URLs for rendering components
//! - [`server`] - Axum-based HTTP endpoint and router
//! - [`transform`] - Geometry, resizing and WebP encoding
//! - [`fetch`] - Source image fetching
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_derivatives::{create_router, HttpFetcher, RouterConfig, StyleRegistry, TransformEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = TransformEngine::new(HttpFetcher::with_defaults()?);
//!     let styles = Arc::new(StyleRegistry::builtin());
//!     let router = create_router(engine, styles, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod server;
pub mod style;
pub mod transform;
pub mod url_builder;

// Re-export commonly used types
pub use config::{Cli, Command, OutputFormat, ServeConfig, StylesConfig, UrlConfig};
pub use error::{FetchError, RequestError, StyleError, TransformError};
pub use fetch::{HttpFetcher, SourceFetcher};
pub use server::{
    create_router, health_handler, image_handler, AppState, DerivativeQueryParams,
    HealthResponse, ImageError, RouterConfig,
};
pub use style::{StyleRegistry, StyleSpec};
pub use transform::{
    Derivative, DerivativeRequest, Geometry, ResizeMode, TransformEngine, WebpEncoder,
    DEFAULT_QUALITY,
};
pub use url_builder::{ImageOptions, ImageSource, StyleSelection, UrlBuilder, Viewport};
