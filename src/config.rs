//! Configuration management for the derivative server.
//!
//! This module provides the command-line interface:
//! - `serve` runs the HTTP server
//! - `url` prints the derivative URL(s) for a source image
//! - `styles` lists the style catalog
//!
//! Server options can also be set via environment variables with the `IMG_`
//! prefix:
//!
//! - `IMG_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMG_PORT` - Server port (default: 3000)
//! - `IMG_FETCH_TIMEOUT` - Source fetch timeout in seconds (default: 10)
//! - `IMG_MAX_SOURCE_BYTES` - Maximum source image size (default: 25 MiB)
//! - `IMG_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 31536000)
//! - `IMG_STYLES` - JSON style catalog replacing the built-in one
//! - `IMG_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::StyleError;
use crate::fetch::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_SOURCE_BYTES};
use crate::server::DEFAULT_CACHE_MAX_AGE;
use crate::style::StyleRegistry;
use crate::url_builder::{ImageOptions, DEFAULT_ENDPOINT};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// On-demand image derivative server.
///
/// Fetches source images, resizes them to a requested shape or named style,
/// and serves them as WebP with immutable cache headers.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-derivatives")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Print the derivative URL(s) for a source image
    Url(UrlConfig),

    /// List the style catalog
    Styles(StylesConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMG_PORT")]
    pub port: u16,

    /// Timeout for fetching a source image, in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, env = "IMG_FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Maximum source image size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SOURCE_BYTES, env = "IMG_MAX_SOURCE_BYTES")]
    pub max_source_bytes: u64,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IMG_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// JSON style catalog to use instead of the built-in styles.
    #[arg(long, env = "IMG_STYLES")]
    pub styles: Option<PathBuf>,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout == 0 {
            return Err("fetch_timeout must be greater than 0".to_string());
        }
        if self.max_source_bytes == 0 {
            return Err("max_source_bytes must be greater than 0".to_string());
        }
        if let Some(ref path) = self.styles {
            if !path.is_file() {
                return Err(format!("Style catalog not found: {}", path.display()));
            }
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

// =============================================================================
// Url
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct UrlConfig {
    /// Source image URL or path.
    pub source: String,

    /// Render width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Render height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Encoding quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Named style.
    #[arg(long, conflicts_with_all = ["mobile_style", "desktop_style"])]
    pub style: Option<String>,

    /// Style used below the mobile breakpoint.
    #[arg(long, requires = "desktop_style")]
    pub mobile_style: Option<String>,

    /// Style used above the mobile breakpoint.
    #[arg(long, requires = "mobile_style")]
    pub desktop_style: Option<String>,

    /// Derivative endpoint the URLs point at.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// JSON style catalog to use instead of the built-in styles.
    #[arg(long, env = "IMG_STYLES")]
    pub styles: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl UrlConfig {
    /// Rendering options described by the flags.
    pub fn image_options(&self) -> ImageOptions {
        let mut options = ImageOptions {
            width: self.width,
            height: self.height,
            quality: self.quality,
            style: None,
        };

        if let Some(ref style) = self.style {
            options = options.style(style.clone());
        } else if let (Some(mobile), Some(desktop)) = (&self.mobile_style, &self.desktop_style) {
            options = options.responsive(mobile.clone(), desktop.clone());
        }

        options
    }
}

// =============================================================================
// Styles
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct StylesConfig {
    /// JSON style catalog to list instead of the built-in styles.
    #[arg(long, env = "IMG_STYLES")]
    pub styles: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output format for the `url` and `styles` commands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Load the style catalog from `path`, or the built-in one when absent.
pub fn load_styles(path: Option<&Path>) -> Result<StyleRegistry, StyleError> {
    match path {
        Some(path) => StyleRegistry::from_path(path),
        None => Ok(StyleRegistry::builtin()),
    }
}

// =============================================================================
// Tests
// =============================================================================
