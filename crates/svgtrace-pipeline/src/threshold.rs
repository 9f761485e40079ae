//! Histogram equalization and binarization.
//!
//! All masks produced here hold only `0` (background) and `255`
//! (foreground) and have the dimensions of their input plane.

use image::{GrayImage, Luma};

use crate::blur;

/// Foreground value in a mask.
pub const FOREGROUND: u8 = 255;

/// Side of the neighbourhood adaptive thresholding averages over.
pub const ADAPTIVE_BLOCK_SIZE: u32 = 11;

/// Amount subtracted from the local mean before comparing.
pub const ADAPTIVE_OFFSET: i16 = 2;

/// Spread a plane's histogram over the full 0..=255 range.
///
/// Each level maps to `(cdf - cdf_min) * 255 / (total - cdf_min)`, rounded,
/// so the darkest level present becomes 0 and the brightest 255. A plane
/// holding a single level is returned unchanged.
#[must_use = "returns the equalized plane"]
pub fn equalize(plane: &GrayImage) -> GrayImage {
    let hist = imageproc::stats::histogram(plane).channels[0];
    let cdf = imageproc::stats::cumulative_histogram(plane).channels[0];
    let total = cdf[255];
    let Some(cdf_min) = hist.iter().copied().find(|&count| count > 0) else {
        return plane.clone();
    };
    if cdf_min == total {
        return plane.clone();
    }

    let scale = f64::from(u8::MAX) / f64::from(total - cdf_min);
    let mut lut = [0u8; 256];
    for (level, &count) in lut.iter_mut().zip(&cdf) {
        let value = (f64::from(count.saturating_sub(cdf_min)) * scale).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            *level = value.clamp(0.0, 255.0) as u8;
        }
    }

    let mut out = plane.clone();
    for p in out.pixels_mut() {
        p.0[0] = lut[usize::from(p.0[0])];
    }
    out
}

/// Adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes foreground when it is brighter than the mean of its
/// [`ADAPTIVE_BLOCK_SIZE`] neighbourhood minus [`ADAPTIVE_OFFSET`]. Flat
/// regions therefore come out as foreground; only pixels noticeably darker
/// than their surroundings drop to background.
#[must_use = "returns the adaptive mask"]
pub fn adaptive(plane: &GrayImage) -> GrayImage {
    let mean = blur::local_mean(plane, ADAPTIVE_BLOCK_SIZE);
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        let p = i16::from(plane.get_pixel(x, y).0[0]);
        let m = i16::from(mean.get_pixel(x, y).0[0]);
        binary(p > m - ADAPTIVE_OFFSET)
    })
}

/// Global threshold: foreground where the pixel is strictly above `level`.
#[must_use = "returns the thresholded mask"]
pub fn global(plane: &GrayImage, level: f64) -> GrayImage {
    GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        binary(f64::from(plane.get_pixel(x, y).0[0]) > level)
    })
}

/// Pixelwise OR of two equal-sized masks.
///
/// # Panics
///
/// Debug builds assert that the masks have the same dimensions.
#[must_use = "returns the combined mask"]
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions(), "mask size mismatch");
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0] | b.get_pixel(x, y).0[0]])
    })
}

/// Number of foreground pixels in a mask.
#[must_use]
pub fn foreground_count(mask: &GrayImage) -> u64 {
    mask.pixels().map(|p| u64::from(p.0[0] > 0)).sum()
}

const fn binary(on: bool) -> Luma<u8> {
    if on { Luma([FOREGROUND]) } else { Luma([0]) }
}
