//! Segmentation plans and the pass routine shared by every colour mode.
//!
//! Each colour mode is a list of passes. A pass binarizes one
//! single-channel plane at one threshold level, cleans the mask with
//! morphology, traces its contours and keeps the ones that survive the
//! area and vertex filters, coloured with the pass's fill:
//!
//! | mode        | plane               | passes                              | fill             |
//! |-------------|---------------------|-------------------------------------|------------------|
//! | `binary`    | equalized luminance | 1 at `threshold`, with Canny edges  | `#000000`        |
//! | `grayscale` | equalized luminance | 7 at [`GRAYSCALE_LEVELS`]           | gray `255-level` |
//! | `color`     | each equalized channel, blue then green then red | 1 per channel at `threshold` | pure channel colour |

use image::{GrayImage, RgbImage};
use tracing::{debug, debug_span};

use crate::contour::{self, BorderKind};
use crate::grayscale::{self, Channel};
use crate::types::{ColorMode, Fill, PassSummary, Polygon, Shape, TraceConfig};
use crate::{edge, morphology, simplify, threshold};

/// Luminance levels of the grayscale plan, darkest band last.
pub const GRAYSCALE_LEVELS: [u8; 7] = [32, 64, 96, 128, 160, 192, 224];

/// Channel order of the color plan.
pub const COLOR_CHANNELS: [Channel; 3] = [Channel::Blue, Channel::Green, Channel::Red];

/// How a pass builds and cleans its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    /// Adaptive OR global OR Canny edges, then close and open.
    Silhouette,
    /// Adaptive OR global, then close.
    Band,
}

/// An equalized plane and its adaptive mask.
///
/// The adaptive mask does not depend on the threshold level, so passes
/// over the same plane share it.
#[derive(Debug, Clone)]
pub struct Plane {
    equalized: GrayImage,
    adaptive: GrayImage,
}

impl Plane {
    /// Equalize `raw` and compute its adaptive mask.
    #[must_use]
    pub fn new(raw: &GrayImage) -> Self {
        let equalized = threshold::equalize(raw);
        let adaptive = threshold::adaptive(&equalized);
        Self {
            equalized,
            adaptive,
        }
    }

    /// Build the cleaned mask for one threshold level.
    #[must_use = "returns the pass mask"]
    pub fn mask(&self, level: f64, recipe: Recipe) -> GrayImage {
        let mut mask = threshold::union(&self.adaptive, &threshold::global(&self.equalized, level));
        if recipe == Recipe::Silhouette {
            let (low, high) = edge::canny_bounds(level);
            #[allow(clippy::cast_possible_truncation)]
            let edges = edge::canny(&self.equalized, low as f32, high as f32);
            mask = threshold::union(&mask, &edges);
        }
        let closed = morphology::close(&mask);
        match recipe {
            Recipe::Silhouette => morphology::open(&closed),
            Recipe::Band => closed,
        }
    }
}

/// One segmentation pass: a plane, the level it is thresholded at, the
/// fill its shapes get and how its mask is built.
#[derive(Debug, Clone, Copy)]
pub struct Pass<'a> {
    pub plane: &'a Plane,
    pub level: f64,
    pub fill: Fill,
    pub recipe: Recipe,
}

/// Shapes and counts produced by one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutput {
    /// Retained shapes in trace order.
    pub shapes: Vec<Shape>,
    /// Counts for reporting.
    pub summary: PassSummary,
}

/// Run every pass of the configured colour mode over `image`.
#[must_use = "returns the pass outputs"]
pub fn segment(image: &RgbImage, config: &TraceConfig) -> Vec<PassOutput> {
    match config.mode {
        ColorMode::Binary => {
            let plane = Plane::new(&grayscale::to_luma(image));
            let pass = Pass {
                plane: &plane,
                level: config.threshold,
                fill: Fill::BLACK,
                recipe: Recipe::Silhouette,
            };
            vec![run_pass(&pass, config)]
        }
        ColorMode::Grayscale => {
            let plane = Plane::new(&grayscale::to_luma(image));
            GRAYSCALE_LEVELS
                .iter()
                .map(|&level| {
                    let pass = Pass {
                        plane: &plane,
                        level: f64::from(level),
                        fill: Fill::gray(u8::MAX - level),
                        recipe: Recipe::Band,
                    };
                    run_pass(&pass, config)
                })
                .collect()
        }
        ColorMode::Color => COLOR_CHANNELS
            .iter()
            .map(|&channel| {
                let plane = Plane::new(&grayscale::channel(image, channel));
                let pass = Pass {
                    plane: &plane,
                    level: config.threshold,
                    fill: channel_fill(channel),
                    recipe: Recipe::Band,
                };
                run_pass(&pass, config)
            })
            .collect(),
    }
}

/// Pure colour of a channel: that channel at full intensity, the others off.
#[must_use]
pub const fn channel_fill(channel: Channel) -> Fill {
    let mut rgb = [0; 3];
    rgb[channel.index()] = u8::MAX;
    Fill::Rgb(rgb)
}

/// Mask, trace and filter one plane at one level.
#[must_use = "returns the pass output"]
pub fn run_pass(pass: &Pass<'_>, config: &TraceConfig) -> PassOutput {
    let Pass {
        plane,
        level,
        fill,
        recipe,
    } = *pass;
    let span = debug_span!("pass", level, %fill, ?recipe);
    let _enter = span.enter();

    let mask = plane.mask(level, recipe);
    debug!(
        foreground = threshold::foreground_count(&mask),
        "mask built"
    );

    let contours = contour::trace(&mask);
    let found = contours.len();
    let holes = contours.iter().filter(|c| c.kind == BorderKind::Hole).count();

    let shapes: Vec<Shape> = contours
        .into_iter()
        .filter_map(|c| retain(c.polygon, fill, config))
        .collect();

    debug!(found, holes, kept = shapes.len(), "contours filtered");

    PassOutput {
        summary: PassSummary {
            level,
            fill,
            found,
            holes,
            kept: shapes.len(),
        },
        shapes,
    }
}

/// Apply the area filter, simplify, and apply the vertex filter.
fn retain(polygon: Polygon, fill: Fill, config: &TraceConfig) -> Option<Shape> {
    if polygon.area() < config.min_area {
        return None;
    }
    let tolerance = simplify::tolerance_for(&polygon, config.epsilon);
    let simplified = simplify::approximate(&polygon, tolerance);
    (simplified.len() >= 3).then_some(Shape {
        polygon: simplified,
        fill,
    })
}
