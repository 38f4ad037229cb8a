//! HTTP request handlers for the derivative API.
//!
//! # Endpoints
//!
//! - `GET /api/image?url=&width=&height=&quality=&style=&crop=` - Serve a derivative
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RequestError, TransformError};
use crate::fetch::SourceFetcher;
use crate::style::StyleRegistry;
use crate::transform::{
    DerivativeRequest, TransformEngine, DEFAULT_QUALITY, MAX_QUALITY, OUTPUT_CONTENT_TYPE,
};

/// Body returned for any validation failure.
pub const MISSING_PARAMETERS_MESSAGE: &str = "Missing required parameters";

/// Body returned for any fetch or transform failure.
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing image";

/// Default Cache-Control max-age in seconds (one year).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 31_536_000;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// Both members are read-only after startup; cloning only bumps reference
/// counts.
pub struct AppState<F: SourceFetcher> {
    /// The engine that produces derivatives
    pub engine: Arc<TransformEngine<F>>,

    /// Style catalog used to resolve crop policy from `style=`
    pub styles: Arc<StyleRegistry>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,
}

impl<F: SourceFetcher> AppState<F> {
    pub fn new(engine: TransformEngine<F>, styles: Arc<StyleRegistry>) -> Self {
        Self {
            engine: Arc::new(engine),
            styles,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }

    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    /// Cache-Control value for successful derivatives.
    ///
    /// The URL fully encodes the output, so responses never change.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}, immutable", self.cache_max_age)
    }
}

impl<F: SourceFetcher> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            styles: Arc::clone(&self.styles),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Raw query parameters for derivative requests.
///
/// Everything is taken as a string so that malformed values end up in the
/// same 400 response as missing ones.
#[derive(Debug, Default, Deserialize)]
pub struct DerivativeQueryParams {
    /// Source image URL
    #[serde(default)]
    pub url: Option<String>,

    /// Target width in pixels
    #[serde(default)]
    pub width: Option<String>,

    /// Target height in pixels
    #[serde(default)]
    pub height: Option<String>,

    /// Encoding quality (1-100, defaults to 90)
    #[serde(default)]
    pub quality: Option<String>,

    /// Named style to inherit the crop policy from
    #[serde(default)]
    pub style: Option<String>,

    /// Explicit crop flag (`"true"` crops, anything else fits)
    #[serde(default)]
    pub crop: Option<String>,
}

impl DerivativeQueryParams {
    /// Validate and resolve the parameters into a request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingParameter`] when `url` is missing or
    /// blank, or `width`/`height` is missing, not a number, or zero.
    pub fn into_request(self, styles: &StyleRegistry) -> Result<DerivativeRequest, RequestError> {
        let source_url = self
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or(RequestError::MissingParameter("url"))?;
        let width =
            parse_dimension(self.width.as_deref()).ok_or(RequestError::MissingParameter("width"))?;
        let height = parse_dimension(self.height.as_deref())
            .ok_or(RequestError::MissingParameter("height"))?;

        Ok(DerivativeRequest {
            source_url,
            width,
            height,
            quality: parse_quality(self.quality.as_deref()),
            crop: resolve_crop(styles, self.style.as_deref(), self.crop.as_deref()),
        })
    }
}

/// Parse a non-zero pixel dimension.
fn parse_dimension(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|value| *value > 0)
}

/// Parse quality; absent, unparsable or zero falls back to the default,
/// values above 100 are clamped.
fn parse_quality(raw: Option<&str>) -> u8 {
    raw.and_then(|q| q.trim().parse::<u32>().ok())
        .filter(|q| *q > 0)
        .map(|q| q.min(MAX_QUALITY as u32) as u8)
        .unwrap_or(DEFAULT_QUALITY)
}

/// Resolve the effective crop policy.
///
/// Precedence, highest first:
/// 1. a known style that declares `crop` (the query flag is ignored)
/// 2. the `crop` query parameter (`"true"` → crop, anything else → fit)
/// 3. crop
pub fn resolve_crop(styles: &StyleRegistry, style: Option<&str>, crop: Option<&str>) -> bool {
    if let Some(declared) = style.and_then(|name| styles.declared_crop(name)) {
        return declared;
    }
    match crop {
        Some(value) => value == "true",
        None => true,
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors surfaced by the derivative handler.
///
/// Bodies are fixed plain-text strings; details stay in the server log.
#[derive(Debug)]
pub enum ImageError {
    /// Validation failed before any I/O (400)
    InvalidRequest(RequestError),
    /// Fetch, decode or encode failed (500)
    Processing(TransformError),
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        match self {
            ImageError::InvalidRequest(err) => {
                debug!(status = 400, "Client error: {}", err);
                (StatusCode::BAD_REQUEST, MISSING_PARAMETERS_MESSAGE).into_response()
            }
            ImageError::Processing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR_MESSAGE).into_response()
            }
        }
    }
}

impl From<RequestError> for ImageError {
    fn from(err: RequestError) -> Self {
        ImageError::InvalidRequest(err)
    }
}

impl From<TransformError> for ImageError {
    fn from(err: TransformError) -> Self {
        ImageError::Processing(err)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle derivative requests.
///
/// # Endpoint
///
/// `GET /api/image`
///
/// # Query Parameters
///
/// - `url`: Source image URL (required)
/// - `width`, `height`: Target box in pixels (required, non-zero)
/// - `quality`: WebP quality 1-100 (default: 90)
/// - `style`: Style name; a style that declares `crop` overrides `crop`
/// - `crop`: `true` to fill and crop, anything else to fit (default: true)
///
/// # Response
///
/// - `200 OK`: WebP bytes
/// - `400 Bad Request`: `Missing required parameters`
/// - `500 Internal Server Error`: `Error processing image`
///
/// # Headers
///
/// - `Content-Type: image/webp`
/// - `Cache-Control: public, max-age={cache_max_age}, immutable`
/// - `X-Image-Width`, `X-Image-Height`: output dimensions
/// - `X-Image-Mode`: `cover` or `contain`
pub async fn image_handler<F: SourceFetcher>(
    State(state): State<AppState<F>>,
    query: Result<Query<DerivativeQueryParams>, QueryRejection>,
) -> Result<Response, ImageError> {
    // Undecodable query strings are treated like missing parameters
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let request = params.into_request(&state.styles)?;

    let derivative = state.engine.transform(&request).await.map_err(|err| {
        error!(
            source = %request.source_url,
            width = request.width,
            height = request.height,
            quality = request.quality,
            crop = request.crop,
            error = %err,
            "Failed to process image"
        );
        ImageError::from(err)
    })?;

    let geometry = derivative.geometry;
    let headers = [
        (header::CONTENT_TYPE, OUTPUT_CONTENT_TYPE.to_string()),
        (header::CACHE_CONTROL, state.cache_control()),
        (
            header::HeaderName::from_static("x-image-width"),
            geometry.target_width.to_string(),
        ),
        (
            header::HeaderName::from_static("x-image-height"),
            geometry.target_height.to_string(),
        ),
        (
            header::HeaderName::from_static("x-image-mode"),
            geometry.mode.as_str().to_string(),
        ),
    ];

    Ok((StatusCode::OK, headers, derivative.data).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
