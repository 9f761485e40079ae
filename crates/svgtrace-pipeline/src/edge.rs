//! Canny edge detection for the binary silhouette plan.
//!
//! Wraps [`imageproc::edges::canny`] and derives its two hysteresis
//! thresholds from the single user-facing `threshold` parameter. Returns
//! a binary image where white pixels (255) are edges and black pixels (0)
//! are background, so it can be OR-ed straight into a threshold mask.

use image::GrayImage;

/// Minimum allowed Canny threshold.
///
/// A low threshold of zero treats every pixel with any gradient as a
/// potential edge and floods the mask.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Distance of each hysteresis bound from the global threshold.
pub const CANNY_MARGIN: f64 = 50.0;

/// Lowest value the derived low bound may take.
pub const CANNY_FLOOR: f64 = 50.0;

/// Highest value the derived high bound may take.
pub const CANNY_CEILING: f64 = 255.0;

/// Hysteresis bounds for a global threshold level:
/// `low = max(threshold - 50, 50)`, `high = min(threshold + 50, 255)`.
#[must_use]
pub fn canny_bounds(threshold: f64) -> (f64, f64) {
    (
        (threshold - CANNY_MARGIN).max(CANNY_FLOOR),
        (threshold + CANNY_MARGIN).min(CANNY_CEILING),
    )
}

/// Detect edges using the Canny algorithm.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to be at most `high_threshold`, so bounds
/// derived from an extreme global threshold (e.g. above 305, where the
/// low bound would exceed the high one) still produce a valid call.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}
