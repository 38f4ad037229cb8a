//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │       GET /api/image?url=&width=&height=&quality=&style=&crop=  │
//! │                                                                 │
//! │  ┌──────────────────────────────┐  ┌─────────────────────────┐  │
//! │  │          handlers            │  │        routes           │  │
//! │  │ (validation, crop precedence,│  │ (router, CORS, tracing) │  │
//! │  │  cache headers)              │  │                         │  │
//! │  └──────────────────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, image_handler, resolve_crop, AppState, DerivativeQueryParams,
    HealthResponse, ImageError, DEFAULT_CACHE_MAX_AGE, MISSING_PARAMETERS_MESSAGE,
    PROCESSING_ERROR_MESSAGE,
};
pub use routes::{create_router, RouterConfig, IMAGE_ROUTE};
