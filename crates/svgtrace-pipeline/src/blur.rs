//! Gaussian smoothing.
//!
//! Two fixed-size Gaussian filters are used by the pipeline:
//!
//! - [`smooth`]: the optional 3x3 pre-blur applied to the decoded colour
//!   image before segmentation.
//! - [`local_mean`]: the Gaussian-weighted neighbourhood mean that
//!   adaptive thresholding compares every pixel against.
//!
//! Both are separable and run through
//! [`imageproc::filter::separable_filter_equal`], which replicates edge
//! pixels past the image border.

use image::{GrayImage, RgbImage};

/// 1D taps of the 3x3 binomial pre-blur (`[1, 2, 1] / 4` per axis).
pub const BLUR_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

/// Apply the fixed 3x3 Gaussian blur to every channel of `image`.
#[must_use = "returns the blurred image"]
pub fn smooth(image: &RgbImage) -> RgbImage {
    imageproc::filter::separable_filter_equal(image, &BLUR_KERNEL)
}

/// Gaussian-weighted mean over a `block_size` x `block_size` window.
///
/// `block_size` must be odd; even sizes are rounded up to the next odd
/// value so the window stays centred.
#[must_use = "returns the local mean plane"]
pub fn local_mean(plane: &GrayImage, block_size: u32) -> GrayImage {
    let kernel = gaussian_kernel(block_size | 1);
    imageproc::filter::separable_filter_equal(plane, &kernel)
}

/// Normalised 1D Gaussian kernel of odd length `size`.
///
/// Sigma is derived from the size as `0.3 * ((size - 1) / 2 - 1) + 0.8`,
/// the usual convention when only a window size is given (size 11 gives
/// sigma 2.0).
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let radius = f64::from(size / 2);
    let sigma = 0.3f64.mul_add(radius - 1.0, 0.8);
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = f64::from(i) - radius;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / total) as f32).collect()
}
