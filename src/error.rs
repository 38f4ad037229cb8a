use thiserror::Error;

/// Errors that can occur when fetching a source image
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Source URL is not an absolute http(s) URL
    #[error("Invalid source URL: {url}")]
    InvalidUrl { url: String },

    /// Network or connection error
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Source host did not answer within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Source host answered with a non-success status
    #[error("Source {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Source body exceeds the configured size limit
    #[error("Source {url} exceeds the maximum of {limit} bytes")]
    TooLarge { url: String, limit: u64 },
}

/// Errors that can occur while producing a derivative
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The source image could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The source bytes are not a recognizable image
    #[error("Failed to decode source: {message}")]
    Decode { message: String },

    /// The derivative could not be encoded
    #[error("Failed to encode derivative: {message}")]
    Encode { message: String },

    /// The blocking worker running the pixel pipeline failed
    #[error("Transform worker failed: {message}")]
    Worker { message: String },
}

/// Errors that can occur when building a style catalog
#[derive(Debug, Clone, Error)]
pub enum StyleError {
    /// Style has a zero width or height
    #[error("Style '{name}' has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        name: String,
        width: u32,
        height: u32,
    },

    /// Style quality is outside 1-100
    #[error("Style '{name}' has invalid quality {quality} (must be 1-100)")]
    InvalidQuality { name: String, quality: u8 },

    /// Style name is empty
    #[error("Style name must not be empty")]
    EmptyName,

    /// Two styles share a name
    #[error("Duplicate style name: {0}")]
    Duplicate(String),

    /// Catalog file could not be read
    #[error("Failed to read style catalog {path}: {message}")]
    Read { path: String, message: String },

    /// Catalog file is not valid JSON for a style table
    #[error("Failed to parse style catalog: {0}")]
    Parse(String),
}

/// Errors raised while validating derivative request parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// `url`, `width` or `height` is missing, unparsable or zero
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}
