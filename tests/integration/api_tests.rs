//! API integration tests for derivative retrieval and error handling.
//!
//! Tests verify:
//! - Cover/contain sizing through the HTTP endpoint
//! - Validation errors never trigger a fetch
//! - Style crop precedence
//! - Response codes, bodies and cache headers

use std::sync::atomic::Ordering;

use axum::http::StatusCode;

use image_derivatives::style::{StyleRegistry, StyleSpec};

use super::test_utils::{
    body_bytes, create_jpeg, create_rgba_png, get, image_uri, is_valid_webp, test_router,
    test_router_with_styles, webp_dimensions, MockFetcher,
};

const PHOTO: &str = "https://example.com/photo.jpg";
const WIDE: &str = "https://example.com/wide.jpg";
const TALL: &str = "https://example.com/tall.jpg";
const SMALL: &str = "https://example.com/small.jpg";

fn fetcher() -> MockFetcher {
    MockFetcher::new()
        .with_source(PHOTO, create_jpeg(1600, 1200))
        .with_source(WIDE, create_jpeg(2000, 1000))
        .with_source(TALL, create_jpeg(600, 1800))
        .with_source(SMALL, create_jpeg(320, 240))
}

// =============================================================================
// Successful Derivatives
// =============================================================================

#[tokio::test]
async fn test_derivative_end_to_end() {
    let router = test_router(fetcher());

    let response = get(&router, &image_uri(PHOTO, "width=800&height=600&quality=80")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/webp"
    );
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=31536000, immutable"
    );
    assert_eq!(response.headers().get("x-image-mode").unwrap(), "cover");

    let body = body_bytes(response).await;
    assert!(is_valid_webp(&body), "Response should be a valid WebP");
    assert_eq!(webp_dimensions(&body), (800, 600));
}

#[tokio::test]
async fn test_cover_always_matches_requested_box() {
    let router = test_router(fetcher());

    for source in [PHOTO, WIDE, TALL] {
        for (width, height) in [(300, 300), (500, 200), (200, 500), (480, 360)] {
            let uri = image_uri(source, &format!("width={}&height={}", width, height));
            let response = get(&router, &uri).await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = body_bytes(response).await;
            assert_eq!(
                webp_dimensions(&body),
                (width, height),
                "cover of {} into {}x{}",
                source,
                width,
                height
            );
        }
    }
}

#[tokio::test]
async fn test_contain_fits_box_and_keeps_aspect() {
    let router = test_router(fetcher());
    let sources = [(PHOTO, 1600u32, 1200u32), (WIDE, 2000, 1000), (TALL, 600, 1800)];

    for (source, src_w, src_h) in sources {
        for (width, height) in [(400, 400), (500, 200), (200, 500)] {
            let uri = image_uri(source, &format!("width={}&height={}&crop=false", width, height));
            let response = get(&router, &uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers().get("x-image-mode").unwrap(), "contain");

            let (out_w, out_h) = webp_dimensions(&body_bytes(response).await);
            assert!(out_w <= width && out_h <= height, "{}x{} exceeds box", out_w, out_h);
            assert!(out_w == width || out_h == height, "one side should touch the box");

            // Aspect preserved within one pixel of rounding
            let expected_h = out_w as f64 * src_h as f64 / src_w as f64;
            assert!(
                (out_h as f64 - expected_h).abs() <= 1.0,
                "{} -> {}x{} distorts aspect",
                source,
                out_w,
                out_h
            );
        }
    }
}

#[tokio::test]
async fn test_enlargement_guard_cover() {
    let router = test_router(fetcher());

    // 320x240 source, 800x800 requested: box shrinks to 240x240, never upscaled
    let response = get(&router, &image_uri(SMALL, "width=800&height=800")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-width").unwrap(), "240");
    assert_eq!(response.headers().get("x-image-height").unwrap(), "240");
    assert_eq!(webp_dimensions(&body_bytes(response).await), (240, 240));
}

#[tokio::test]
async fn test_enlargement_guard_contain() {
    let router = test_router(fetcher());

    let response = get(&router, &image_uri(SMALL, "width=1000&height=1000&crop=false")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(webp_dimensions(&body_bytes(response).await), (320, 240));
}

#[tokio::test]
async fn test_identical_requests_are_byte_identical() {
    let router = test_router(fetcher());
    let uri = image_uri(PHOTO, "width=640&height=480&quality=70");

    let first = body_bytes(get(&router, &uri).await).await;
    let second = body_bytes(get(&router, &uri).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_quality_changes_output() {
    let router = test_router(fetcher());

    let low = body_bytes(get(&router, &image_uri(PHOTO, "width=640&height=480&quality=10")).await).await;
    let high = body_bytes(get(&router, &image_uri(PHOTO, "width=640&height=480&quality=95")).await).await;
    assert_ne!(low, high);
}

#[tokio::test]
async fn test_transparent_source() {
    let source = "https://example.com/overlay.png";
    let router = test_router(MockFetcher::new().with_source(source, create_rgba_png(400, 200)));

    let response = get(&router, &image_uri(source, "width=200&height=200&crop=false")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(webp_dimensions(&body_bytes(response).await), (200, 100));
}

#[tokio::test]
async fn test_custom_cache_max_age() {
    use image_derivatives::server::{create_router, RouterConfig};
    use image_derivatives::transform::TransformEngine;
    use std::sync::Arc;

    let router = create_router(
        TransformEngine::new(fetcher()),
        Arc::new(StyleRegistry::builtin()),
        RouterConfig::new().with_cache_max_age(600).with_tracing(false),
    );

    let response = get(&router, &image_uri(PHOTO, "width=100&height=100")).await;
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=600, immutable"
    );
}

// =============================================================================
// Style Crop Precedence
// =============================================================================

#[tokio::test]
async fn test_style_crop_wins_over_query() {
    let styles = StyleRegistry::from_specs(vec![
        StyleSpec::new("heroLarge", 1920, 1080).with_crop(true),
    ])
    .unwrap();
    let router = test_router_with_styles(fetcher(), styles);

    let response = get(
        &router,
        &image_uri(WIDE, "width=400&height=400&style=heroLarge&crop=false"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-mode").unwrap(), "cover");
    assert_eq!(webp_dimensions(&body_bytes(response).await), (400, 400));
}

#[tokio::test]
async fn test_builtin_fit_style_wins_over_query() {
    let router = test_router(fetcher());

    let response = get(
        &router,
        &image_uri(WIDE, "width=400&height=400&style=logo&crop=true"),
    )
    .await;
    assert_eq!(response.headers().get("x-image-mode").unwrap(), "contain");
    assert_eq!(webp_dimensions(&body_bytes(response).await), (400, 200));
}

#[tokio::test]
async fn test_style_without_crop_defers_to_query() {
    let router = test_router(fetcher());

    // "card" leaves crop implicit, so the query flag applies
    let response = get(
        &router,
        &image_uri(WIDE, "width=400&height=400&style=card&crop=false"),
    )
    .await;
    assert_eq!(response.headers().get("x-image-mode").unwrap(), "contain");
}

#[tokio::test]
async fn test_unknown_style_is_ignored() {
    let router = test_router(fetcher());

    let response = get(
        &router,
        &image_uri(WIDE, "width=400&height=400&style=doesNotExist"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-mode").unwrap(), "cover");
}

#[tokio::test]
async fn test_injected_catalog_replaces_builtin() {
    let styles = StyleRegistry::from_specs(vec![StyleSpec::new("logo", 10, 10)]).unwrap();
    let router = test_router_with_styles(fetcher(), styles);

    // The injected "logo" does not declare crop, unlike the built-in one
    let response = get(&router, &image_uri(WIDE, "width=400&height=400&style=logo")).await;
    assert_eq!(response.headers().get("x-image-mode").unwrap(), "cover");
}

// =============================================================================
// Validation Errors
// =============================================================================

async fn assert_rejected_without_fetch(uri: &str) {
    let fetcher = fetcher();
    let calls = fetcher.call_counter();
    let router = test_router(fetcher);

    let response = get(&router, uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

    let body = body_bytes(response).await;
    assert_eq!(&body[..], b"Missing required parameters");
    assert_eq!(calls.load(Ordering::SeqCst), 0, "{} should not fetch", uri);
}

#[tokio::test]
async fn test_missing_height() {
    assert_rejected_without_fetch(&image_uri(PHOTO, "width=800")).await;
}

#[tokio::test]
async fn test_missing_width() {
    assert_rejected_without_fetch(&image_uri(PHOTO, "height=600")).await;
}

#[tokio::test]
async fn test_missing_url() {
    assert_rejected_without_fetch("/api/image?width=800&height=600").await;
    assert_rejected_without_fetch("/api/image?url=&width=800&height=600").await;
}

#[tokio::test]
async fn test_zero_dimensions() {
    assert_rejected_without_fetch(&image_uri(PHOTO, "width=0&height=600")).await;
    assert_rejected_without_fetch(&image_uri(PHOTO, "width=800&height=0")).await;
}

#[tokio::test]
async fn test_non_numeric_dimensions() {
    assert_rejected_without_fetch(&image_uri(PHOTO, "width=wide&height=600")).await;
    assert_rejected_without_fetch(&image_uri(PHOTO, "width=800&height=-1")).await;
}

#[tokio::test]
async fn test_no_parameters() {
    assert_rejected_without_fetch("/api/image").await;
}

// =============================================================================
// Processing Errors
// =============================================================================

#[tokio::test]
async fn test_fetch_failure_returns_500_without_retry() {
    let fetcher = fetcher();
    let calls = fetcher.call_counter();
    let router = test_router(fetcher);

    let response = get(
        &router,
        &image_uri("https://example.com/missing.jpg", "width=100&height=100"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(&body_bytes(response).await[..], b"Error processing image");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_image_source_returns_500() {
    let source = "https://example.com/page.html";
    let router = test_router(
        MockFetcher::new().with_source(source, b"<!doctype html><p>nope</p>".to_vec()),
    );

    let response = get(&router, &image_uri(source, "width=100&height=100")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_bytes(response).await;
    assert_eq!(&body[..], b"Error processing image");
}

#[tokio::test]
async fn test_truncated_image_returns_500() {
    let source = "https://example.com/truncated.jpg";
    let mut data = create_jpeg(200, 200);
    data.truncate(data.len() / 3);
    let router = test_router(MockFetcher::new().with_source(source, data));

    let response = get(&router, &image_uri(source, "width=100&height=100")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router(MockFetcher::new());

    let response = get(&router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}
