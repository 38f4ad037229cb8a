//! Pure geometry for derivative sizing.
//!
//! All functions here are pure and testable without any I/O or images.

/// Largest width or height a WebP image can have.
pub const MAX_OUTPUT_DIMENSION: u32 = 16383;

/// How the source is mapped onto the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Fill the box exactly, cropping overflow around the centre.
    Cover,
    /// Fit entirely inside the box, preserving the source aspect ratio.
    Contain,
}

impl ResizeMode {
    /// `crop=true` selects [`ResizeMode::Cover`], `crop=false` selects [`ResizeMode::Contain`].
    pub fn from_crop(crop: bool) -> Self {
        if crop {
            ResizeMode::Cover
        } else {
            ResizeMode::Contain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::Cover => "cover",
            ResizeMode::Contain => "contain",
        }
    }
}

/// Final sizing decision for one derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub source_width: u32,
    pub source_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub mode: ResizeMode,
}

impl Geometry {
    /// Compute the output size for a source of `source` pixels and a
    /// requested box of `requested` pixels.
    ///
    /// Never upscales:
    /// - `Cover` keeps the requested aspect ratio and shrinks the box
    ///   uniformly until it fits inside the source
    /// - `Contain` fits the source aspect into the box, then caps the result
    ///   at the source's native size
    ///
    /// Either way the result is then shrunk uniformly so that no side exceeds
    /// [`MAX_OUTPUT_DIMENSION`].
    ///
    /// Both inputs must be non-zero in each dimension.
    pub fn compute(source: (u32, u32), requested: (u32, u32), mode: ResizeMode) -> Self {
        let (target_width, target_height) = cap_at_max_dimension(match mode {
            ResizeMode::Cover => clamp_box_to_source(source, requested),
            ResizeMode::Contain => cap_at_source(source, fit_within(source, requested)),
        });

        Self {
            source_width: source.0,
            source_height: source.1,
            target_width,
            target_height,
            mode,
        }
    }

    /// Whether the output is the same size as the source.
    pub fn is_identity(&self) -> bool {
        self.source_width == self.target_width && self.source_height == self.target_height
    }
}

/// Largest size with the source aspect ratio that fits inside `bounds`.
///
/// If the source is relatively wider than the box, the box width is kept and
/// the height shrinks; otherwise the height is kept and the width shrinks.
///
/// # Examples
/// ```
/// # use image_derivatives::transform::fit_within;
/// // 4000x1000 (4:1) into 800x600 → width kept
/// assert_eq!(fit_within((4000, 1000), (800, 600)), (800, 200));
///
/// // 1000x2000 (1:2) into 800x600 → height kept
/// assert_eq!(fit_within((1000, 2000), (800, 600)), (300, 600));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (box_w, box_h) = bounds;

    let src_aspect = src_w as f64 / src_h as f64;
    let box_aspect = box_w as f64 / box_h as f64;

    if src_aspect > box_aspect {
        let h = (box_w as f64 / src_aspect).round() as u32;
        (box_w, h.max(1))
    } else {
        let w = (box_h as f64 * src_aspect).round() as u32;
        (w.max(1), box_h)
    }
}

/// Shrink a crop box uniformly so it fits inside the source.
///
/// Boxes that already fit are returned unchanged.
pub fn clamp_box_to_source(source: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (req_w, req_h) = requested;

    if req_w <= src_w && req_h <= src_h {
        return requested;
    }

    let scale = (src_w as f64 / req_w as f64).min(src_h as f64 / req_h as f64);
    let w = ((req_w as f64 * scale).round() as u32).clamp(1, src_w);
    let h = ((req_h as f64 * scale).round() as u32).clamp(1, src_h);
    (w, h)
}

fn cap_at_source(source: (u32, u32), fitted: (u32, u32)) -> (u32, u32) {
    if fitted.0 > source.0 || fitted.1 > source.1 {
        source
    } else {
        fitted
    }
}

/// Scale `size` down uniformly until both sides are within
/// [`MAX_OUTPUT_DIMENSION`]. Sizes already within the limit are unchanged.
fn cap_at_max_dimension(size: (u32, u32)) -> (u32, u32) {
    let (w, h) = size;
    let longest = w.max(h);
    if longest <= MAX_OUTPUT_DIMENSION {
        return size;
    }

    let scale = MAX_OUTPUT_DIMENSION as f64 / longest as f64;
    let w = ((w as f64 * scale).round() as u32).clamp(1, MAX_OUTPUT_DIMENSION);
    let h = ((h as f64 * scale).round() as u32).clamp(1, MAX_OUTPUT_DIMENSION);
    (w, h)
}
