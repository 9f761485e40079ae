//! Image decoding and single-channel plane extraction.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the RGB
//! image the pipeline works on, plus the single-channel planes the
//! segmenter thresholds: luminance, or one colour channel on its own.

use image::{GrayImage, Luma, RgbImage};

use crate::types::PipelineError;

/// Luminance weights for red, green and blue, in thousandths (ITU-R BT.601).
const LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];

/// One channel of an RGB image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Index of the channel within an `Rgb<u8>` pixel.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Decode raw image bytes into an 8-bit RGB image.
///
/// Alpha is discarded and 16-bit or grayscale sources are converted, so
/// every later stage sees exactly three 8-bit channels.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Convert to grayscale with the BT.601 weights `0.299*R + 0.587*G + 0.114*B`,
/// rounded to the nearest integer.
#[must_use = "returns the luminance plane"]
pub fn to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let weighted: u32 = image
            .get_pixel(x, y)
            .0
            .iter()
            .zip(LUMA_WEIGHTS)
            .map(|(&c, w)| u32::from(c) * w)
            .sum();
        // The weights sum to 1000, so the rounded quotient never exceeds 255.
        Luma([u8::try_from((weighted + 500) / 1000).unwrap_or(u8::MAX)])
    })
}

/// Extract one colour channel as its own plane.
#[must_use = "returns the channel plane"]
pub fn channel(image: &RgbImage, channel: Channel) -> GrayImage {
    let c = channel.index();
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[c]])
    })
}
