//! Derivative URL construction for rendering components.
//!
//! Page templates ask for an image by source URL plus either explicit
//! dimensions or a style name (or a mobile/desktop style pair). The builder
//! answers with an [`ImageSource`]: one URL, or a responsive pair tagged by
//! viewport.
//!
//! Vector sources (`.svg`) and local/relative paths are returned untouched;
//! they never reach the derivative endpoint.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use image_derivatives::style::StyleRegistry;
//! use image_derivatives::url_builder::{ImageOptions, ImageSource, UrlBuilder};
//!
//! let builder = UrlBuilder::new(Arc::new(StyleRegistry::builtin()));
//!
//! let source = builder.build("https://cdn.example.com/logo.svg", &ImageOptions::new().width(500));
//! assert_eq!(source, ImageSource::Single { url: "https://cdn.example.com/logo.svg".into() });
//!
//! let source = builder.build("https://cdn.example.com/team.jpg", &ImageOptions::new().style("card"));
//! assert!(source.primary_url().starts_with("/api/image?url="));
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::style::{StyleRegistry, StyleSpec};
use crate::transform::DEFAULT_QUALITY;

/// Path of the derivative endpoint.
pub const DEFAULT_ENDPOINT: &str = "/api/image";

/// Widest viewport, in CSS pixels, that counts as mobile.
pub const MOBILE_MAX_WIDTH: u32 = 767;

/// Render width used when neither a style nor a width is given.
pub const DEFAULT_RENDER_WIDTH: u32 = 1200;

const VECTOR_EXTENSIONS: &[&str] = &[".svg", ".svgz"];

/// Schemes whose URLs never resolve to a fetchable remote image.
const INLINE_SCHEMES: &[&str] = &["data", "blob"];

// =============================================================================
// Options
// =============================================================================

/// Which style(s) to render with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSelection {
    Single(String),
    Responsive { mobile: String, desktop: String },
}

/// Caller-provided rendering options. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    pub style: Option<StyleSelection>,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn style(mut self, name: impl Into<String>) -> Self {
        self.style = Some(StyleSelection::Single(name.into()));
        self
    }

    pub fn responsive(mut self, mobile: impl Into<String>, desktop: impl Into<String>) -> Self {
        self.style = Some(StyleSelection::Responsive {
            mobile: mobile.into(),
            desktop: desktop.into(),
        });
        self
    }
}

// =============================================================================
// Output
// =============================================================================

/// Viewport range an image applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    /// Up to and including [`MOBILE_MAX_WIDTH`]
    Mobile,
    /// Wider than [`MOBILE_MAX_WIDTH`]
    Desktop,
}

impl Viewport {
    /// CSS media query selecting this viewport.
    pub fn media_query(&self) -> String {
        match self {
            Viewport::Mobile => format!("(max-width: {}px)", MOBILE_MAX_WIDTH),
            Viewport::Desktop => format!("(min-width: {}px)", MOBILE_MAX_WIDTH + 1),
        }
    }
}

/// What a rendering component should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// One image for every viewport.
    Single { url: String },
    /// A mobile image shown below the breakpoint and a desktop image above it.
    Responsive { mobile: String, desktop: String },
}

impl ImageSource {
    /// The URL to use when only one can be shown (desktop for a pair).
    pub fn primary_url(&self) -> &str {
        match self {
            ImageSource::Single { url } => url,
            ImageSource::Responsive { desktop, .. } => desktop,
        }
    }

    /// URL for a given viewport.
    pub fn url_for(&self, viewport: Viewport) -> &str {
        match (self, viewport) {
            (ImageSource::Single { url }, _) => url,
            (ImageSource::Responsive { mobile, .. }, Viewport::Mobile) => mobile,
            (ImageSource::Responsive { desktop, .. }, Viewport::Desktop) => desktop,
        }
    }

    /// Whether the consumer must skip its own client-side scaling.
    ///
    /// Responsive pairs are already produced at exact pixel sizes.
    pub fn unoptimized(&self) -> bool {
        matches!(self, ImageSource::Responsive { .. })
    }
}

// =============================================================================
// URL Builder
// =============================================================================

/// Builds canonical derivative URLs.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    endpoint: String,
    styles: Arc<StyleRegistry>,
}

impl UrlBuilder {
    /// Create a builder that targets [`DEFAULT_ENDPOINT`].
    pub fn new(styles: Arc<StyleRegistry>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            styles,
        }
    }

    /// Target a different endpoint, e.g. an absolute CDN URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the image source for `source_url`.
    pub fn build(&self, source_url: &str, options: &ImageOptions) -> ImageSource {
        if is_vector_source(source_url) || is_local_source(source_url) {
            return ImageSource::Single {
                url: source_url.to_string(),
            };
        }

        match &options.style {
            Some(StyleSelection::Single(name)) => ImageSource::Single {
                url: self.styled_url(source_url, name, options),
            },
            Some(StyleSelection::Responsive { mobile, desktop }) => ImageSource::Responsive {
                mobile: self.styled_url(source_url, mobile, options),
                desktop: self.styled_url(source_url, desktop, options),
            },
            None => ImageSource::Single {
                url: self.explicit_url(source_url, options),
            },
        }
    }

    fn styled_url(&self, source_url: &str, name: &str, options: &ImageOptions) -> String {
        match self.styles.lookup(name) {
            Some(style) => self.style_url(source_url, style),
            None => {
                warn!(style = name, "Unknown image style, using explicit dimensions");
                self.explicit_url(source_url, options)
            }
        }
    }

    fn style_url(&self, source_url: &str, style: &StyleSpec) -> String {
        self.derivative_url(
            source_url,
            style.width,
            style.height,
            style.quality,
            Some(&style.name),
            style.crop(),
        )
    }

    fn explicit_url(&self, source_url: &str, options: &ImageOptions) -> String {
        let width = options.width.unwrap_or(DEFAULT_RENDER_WIDTH).max(1);
        let height = options.height.unwrap_or_else(|| derived_height(width)).max(1);
        let quality = options.quality.unwrap_or(DEFAULT_QUALITY);

        self.derivative_url(source_url, width, height, quality, None, true)
    }

    /// Canonical URL; parameter order is fixed.
    pub fn derivative_url(
        &self,
        source_url: &str,
        width: u32,
        height: u32,
        quality: u8,
        style: Option<&str>,
        crop: bool,
    ) -> String {
        let mut url = format!(
            "{}?url={}&width={}&height={}&quality={}",
            self.endpoint,
            urlencoding::encode(source_url),
            width,
            height,
            quality
        );

        if let Some(style) = style {
            url.push_str("&style=");
            url.push_str(&urlencoding::encode(style));
        }

        url.push_str(if crop { "&crop=true" } else { "&crop=false" });
        url
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Height for a render width when none is given: 4:3 on mobile widths,
/// 2:1 on wider ones.
pub fn derived_height(width: u32) -> u32 {
    let ratio = if width <= MOBILE_MAX_WIDTH {
        3.0 / 4.0
    } else {
        1.0 / 2.0
    };
    ((width as f64 * ratio).round() as u32).max(1)
}

/// Whether the source path ends in a vector image extension.
pub fn is_vector_source(source_url: &str) -> bool {
    let path = source_url
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(source_url)
        .to_ascii_lowercase();
    VECTOR_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Whether the source is a local or relative path, or carries its bytes
/// inline (`data:` and `blob:` URLs), rather than an absolute remote URL.
///
/// Protocol-relative URLs (`//host/path`) count as remote.
pub fn is_local_source(source_url: &str) -> bool {
    if source_url.starts_with("//") {
        return false;
    }
    match Url::parse(source_url) {
        Ok(url) => INLINE_SCHEMES.contains(&url.scheme()),
        Err(_) => true,
    }
}

// =============================================================================
// Tests
// =============================================================================
