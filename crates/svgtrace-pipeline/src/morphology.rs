//! Binary morphology with a 2x2 square structuring element.
//!
//! The element is anchored at its bottom-right cell: erosion looks at a
//! pixel and its west, north and north-west neighbours, dilation at the
//! reflected set (east, south, south-east). With the reflection, opening
//! and closing leave a mask in place instead of drifting it by a pixel.
//! Neighbours outside the image are ignored: the border never erodes
//! foreground.
//!
//! - [`close`]: dilation then erosion; fills pinholes and one-pixel gaps.
//! - [`open`]: erosion then dilation; removes isolated specks.

use image::{GrayImage, Luma};

/// Offsets `(dx, dy)` covered by the structuring element.
const ELEMENT: [(i64, i64); 4] = [(-1, -1), (0, -1), (-1, 0), (0, 0)];

/// Morphological closing (dilate, then erode).
#[must_use = "returns the closed mask"]
pub fn close(mask: &GrayImage) -> GrayImage {
    erode(&dilate(mask))
}

/// Morphological opening (erode, then dilate).
#[must_use = "returns the opened mask"]
pub fn open(mask: &GrayImage) -> GrayImage {
    dilate(&erode(mask))
}

/// Maximum over the reflected structuring element.
#[must_use = "returns the dilated mask"]
pub fn dilate(mask: &GrayImage) -> GrayImage {
    apply(mask, -1, |values| values.max())
}

/// Minimum over the structuring element.
#[must_use = "returns the eroded mask"]
pub fn erode(mask: &GrayImage) -> GrayImage {
    apply(mask, 1, |values| values.min())
}

/// Reduce every pixel's neighbourhood; `sign` of -1 reflects the element.
fn apply<F>(mask: &GrayImage, sign: i64, reduce: F) -> GrayImage
where
    F: Fn(&mut dyn Iterator<Item = u8>) -> Option<u8>,
{
    let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let mut values = ELEMENT.iter().filter_map(|&(dx, dy)| {
            let nx = i64::from(x) + sign * dx;
            let ny = i64::from(y) + sign * dy;
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                return None;
            }
            let nx = u32::try_from(nx).ok()?;
            let ny = u32::try_from(ny).ok()?;
            Some(mask.get_pixel(nx, ny).0[0])
        });
        // The anchor cell is always inside the image, so a value exists.
        Luma([reduce(&mut values).unwrap_or_else(|| mask.get_pixel(x, y).0[0])])
    })
}
