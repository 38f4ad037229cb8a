//! Compiled-in style catalog.

use super::StyleSpec;

/// The styles shipped with the service.
///
/// Adding an entry here (or to a `--styles` JSON file) never invalidates
/// existing derivative URLs: every URL carries its full output shape.
pub fn builtin_styles() -> Vec<StyleSpec> {
    vec![
        // Fixed-crop styles
        StyleSpec::new("heroLarge", 1920, 1080).with_priority(true),
        StyleSpec::new("heroMedium", 1280, 720).with_priority(true),
        StyleSpec::new("heroMobile", 768, 1024).with_priority(true),
        StyleSpec::new("banner", 1920, 600).with_quality(85),
        StyleSpec::new("feature", 1200, 675),
        StyleSpec::new("featureMobile", 640, 480),
        StyleSpec::new("card", 600, 400),
        StyleSpec::new("cardMobile", 400, 300),
        StyleSpec::new("pricingIcon", 128, 128),
        StyleSpec::new("testimonial", 96, 96).with_quality(80),
        StyleSpec::new("avatar", 160, 160).with_quality(80),
        StyleSpec::new("thumbnail", 300, 300).with_quality(80),
        StyleSpec::new("ogImage", 1200, 630).with_crop(true),
        // Fit styles
        StyleSpec::new("logo", 400, 200).with_crop(false),
        StyleSpec::new("partnerLogo", 240, 120).with_crop(false),
        StyleSpec::new("diagram", 1200, 800).with_crop(false),
        StyleSpec::new("upload", 1600, 1600).with_crop(false),
    ]
}
