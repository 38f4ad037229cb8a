//! Image Derivatives - an on-demand image resizing server.
//!
//! This binary starts the HTTP server and provides the `url` and `styles`
//! helper commands.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_derivatives::{
    config::{load_styles, Cli, Command, OutputFormat, ServeConfig, StylesConfig, UrlConfig},
    fetch::HttpFetcher,
    server::{create_router, RouterConfig, IMAGE_ROUTE},
    transform::TransformEngine,
    url_builder::{ImageSource, UrlBuilder, Viewport},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Url(config) => run_url(config),
        Command::Styles(config) => run_styles(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let styles = match load_styles(config.styles.as_deref()) {
        Ok(styles) => Arc::new(styles),
        Err(e) => {
            error!("Failed to load styles: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fetcher = match HttpFetcher::new(config.fetch_timeout(), config.max_source_bytes) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    match config.styles {
        Some(ref path) => info!("  Styles: {} from {}", styles.len(), path.display()),
        None => info!("  Styles: {} built-in", styles.len()),
    }
    info!(
        "  Fetch: {}s timeout, {} bytes max",
        config.fetch_timeout, config.max_source_bytes
    );
    info!("  Cache-Control max-age: {}s", config.cache_max_age);

    let engine = TransformEngine::new(fetcher);
    let router = create_router(engine, styles, build_router_config(&config));

    let addr = config.bind_address();
    info!("Server listening on: http://{}", addr);
    info!(
        "  Try: curl 'http://{}{}?url=<source>&width=800&height=600'",
        addr, IMAGE_ROUTE
    );

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_derivatives=debug,tower_http=debug"
    } else {
        "image_derivatives=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Url Command
// =============================================================================

fn run_url(config: UrlConfig) -> ExitCode {
    let styles = match load_styles(config.styles.as_deref()) {
        Ok(styles) => Arc::new(styles),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref name) = config.style {
        if styles.lookup(name).is_none() {
            eprintln!("Warning: unknown style '{}', using explicit dimensions", name);
        }
    }

    let builder = UrlBuilder::new(styles).with_endpoint(config.endpoint.clone());
    let source = builder.build(&config.source, &config.image_options());

    match config.format {
        OutputFormat::Text => match &source {
            ImageSource::Single { url } => println!("{}", url),
            ImageSource::Responsive { mobile, desktop } => {
                println!("{} {}", Viewport::Mobile.media_query(), mobile);
                println!("{} {}", Viewport::Desktop.media_query(), desktop);
            }
        },
        OutputFormat::Json => {
            let json = serde_json::json!({
                "source": config.source,
                "image": source,
                "unoptimized": source.unoptimized(),
            });
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Styles Command
// =============================================================================

fn run_styles(config: StylesConfig) -> ExitCode {
    let styles = match load_styles(config.styles.as_deref()) {
        Ok(styles) => styles,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.format {
        OutputFormat::Text => {
            println!(
                "{:<16} {:>6} {:>6} {:>7}  {:<6} {}",
                "NAME", "WIDTH", "HEIGHT", "QUALITY", "MODE", "PRIORITY"
            );
            for style in styles.iter() {
                println!(
                    "{:<16} {:>6} {:>6} {:>7}  {:<6} {}",
                    style.name,
                    style.width,
                    style.height,
                    style.quality,
                    if style.crop() { "crop" } else { "fit" },
                    if style.priority { "yes" } else { "" }
                );
            }
        }
        OutputFormat::Json => {
            let list: Vec<_> = styles.iter().collect();
            match serde_json::to_string_pretty(&list) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
