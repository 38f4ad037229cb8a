//! Named output styles.
//!
//! A style maps a symbolic name (`heroLarge`, `thumbnail`, ...) to a concrete
//! output shape: width, height, quality, and whether the derivative is cropped
//! to the exact box or fitted inside it.
//!
//! Two families exist by convention:
//!
//! - **fixed-crop** styles leave `crop` unset (meaning `true`) and are used for
//!   hero and card imagery that needs an exact aspect ratio
//! - **fit** styles set `crop: false` and preserve the source aspect ratio,
//!   e.g. logos and uploaded diagrams
//!
//! The catalog is immutable once built. It is shared as an
//! `Arc<StyleRegistry>` between the URL builder and the HTTP endpoint.
//!
//! # Example
//!
//! ```
//! use image_derivatives::style::StyleRegistry;
//!
//! let styles = StyleRegistry::builtin();
//! let hero = styles.lookup("heroLarge").unwrap();
//! assert!(hero.crop());
//! assert!(styles.lookup("no-such-style").is_none());
//! ```

mod catalog;
mod registry;

pub use catalog::builtin_styles;
pub use registry::{StyleRegistry, StyleSpec};
