//! Contour tracing: extract closed boundary rings from a binary mask.
//!
//! Border following is Suzuki-Abe via
//! [`imageproc::contours::find_contours`], which reports every outer
//! border and every hole border together with its parent in the
//! containment tree. The tracer only starts a border at a foreground pixel
//! with a background pixel inside the image to its left, so the mask is
//! traced inside a one-pixel background frame and the points are shifted
//! back afterwards. The traced rings list every boundary pixel; they are
//! then compressed so that straight horizontal, vertical and diagonal runs
//! keep only their end points.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::types::{Point, Polygon};

/// Whether a border encloses foreground or a hole inside foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    Outer,
    Hole,
}

/// A traced boundary with its place in the containment hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedContour {
    /// Compressed boundary ring in pixel coordinates.
    pub polygon: Polygon,
    /// Outer border or hole border.
    pub kind: BorderKind,
    /// Index of the enclosing contour in the same trace, if any.
    pub parent: Option<usize>,
}

/// Trace all borders of the foreground (nonzero) regions in `mask`.
///
/// Contours come back in discovery order (raster scan of their starting
/// pixel); `parent` indices refer to positions in the returned vector.
#[must_use = "returns the traced contours"]
pub fn trace(mask: &GrayImage) -> Vec<TracedContour> {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(&framed(mask));

    contours
        .into_iter()
        .map(|c| {
            let ring: Vec<Point> = c
                .points
                .into_iter()
                .map(|p| Point::new(f64::from(p.x - FRAME), f64::from(p.y - FRAME)))
                .collect();
            TracedContour {
                polygon: compress_runs(&ring),
                kind: match c.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                },
                parent: c.parent,
            }
        })
        .collect()
}

/// Width of the background frame added around a mask before tracing.
const FRAME: i32 = 1;

/// Copy `mask` into a background image one pixel larger on every side.
fn framed(mask: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut out, mask, i64::from(FRAME), i64::from(FRAME));
    out
}

/// Drop every ring vertex that continues a straight run.
///
/// A vertex is kept when the step arriving at it differs in direction from
/// the step leaving it (the ring wraps around, so the first and last
/// vertices are judged against each other). Repeated vertices, including
/// a closing copy of the first one, are dropped first. Rings of fewer than
/// 3 distinct vertices are returned without further compression.
#[must_use = "returns the compressed ring"]
pub fn compress_runs(ring: &[Point]) -> Polygon {
    let mut ring = ring.to_vec();
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    let n = ring.len();
    if n < 3 {
        return Polygon::new(ring);
    }

    let step = |from: Point, to: Point| (direction(to.x - from.x), direction(to.y - from.y));

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            step(prev, ring[i]) != step(ring[i], next)
        })
        .map(|i| ring[i])
        .collect();

    if kept.is_empty() {
        // Unreachable for a real closed ring; keep an anchor regardless.
        return Polygon::new(vec![ring[0]]);
    }
    Polygon::new(kept)
}

/// Sign of a coordinate delta as -1, 0 or 1 (`f64::signum` maps 0 to 1).
fn direction(delta: f64) -> i8 {
    i8::from(delta > 0.0) - i8::from(delta < 0.0)
}
