//! Shared types for the svgtrace image processing pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference planes and
/// masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference the decoded
/// source image without depending on `image` directly.
pub use image::RgbImage;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A closed ring of vertices. The last vertex connects back to the first;
/// the closing vertex is never repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a new polygon from its vertices.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polygon and returns the underlying vertices.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Enclosed area (shoelace formula), independent of orientation.
    ///
    /// Rings with fewer than 3 vertices enclose nothing and return 0.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.0.len() < 3 {
            return 0.0;
        }
        let twice: f64 = self
            .edges()
            .map(|(a, b)| a.x.mul_add(b.y, -(b.x * a.y)))
            .sum();
        twice.abs() / 2.0
    }

    /// Length of the closed boundary, including the closing edge.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        if self.0.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| a.distance(b)).sum()
    }

    /// Iterate over `(from, to)` vertex pairs, closing edge last.
    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.0
            .iter()
            .zip(self.0.iter().cycle().skip(1))
            .map(|(&a, &b)| (a, b))
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fill colour of a traced shape, including the notation it is written in.
///
/// Binary silhouettes are written as `#000000`; layered modes use the
/// functional `rgb(r,g,b)` form. Consumers of the SVG rely on both spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// `#rrggbb` notation.
    Hex([u8; 3]),
    /// `rgb(r,g,b)` notation.
    Rgb([u8; 3]),
}

impl Fill {
    /// Solid black, used for binary silhouettes.
    pub const BLACK: Self = Self::Hex([0, 0, 0]);

    /// Neutral gray with every channel set to `value`.
    #[must_use]
    pub const fn gray(value: u8) -> Self {
        Self::Rgb([value, value, value])
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Hex([r, g, b]) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Rgb([r, g, b]) => write!(f, "rgb({r},{g},{b})"),
        }
    }
}

/// A simplified polygon together with the colour it is drawn in.
///
/// Polygon and fill are paired when the shape is created, so the output
/// order never depends on keeping two lists aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Simplified outline; always at least 3 vertices.
    pub polygon: Polygon,
    /// Fill colour.
    pub fill: Fill,
}

/// Segmentation strategy selected by the `colorMode` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// One black silhouette from luminance.
    Binary,
    /// Seven gray bands at fixed luminance levels.
    Grayscale,
    /// One pure-colour layer per source channel.
    Color,
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Grayscale => "grayscale",
            Self::Color => "color",
        })
    }
}

/// Configuration for a trace run.
///
/// This is also the wire format of the command-line parameter object:
/// `colorMode`, `minArea` and `epsilon` are required, `threshold` and
/// `smooth` fall back to [`Self::DEFAULT_THRESHOLD`] and
/// [`Self::DEFAULT_SMOOTH`]. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceConfig {
    /// Which segmentation plan to run.
    #[serde(rename = "colorMode")]
    pub mode: ColorMode,

    /// Contours enclosing less than this many square pixels are dropped.
    pub min_area: f64,

    /// Simplification coefficient: the Douglas-Peucker tolerance is
    /// `epsilon` percent of the contour perimeter.
    pub epsilon: f64,

    /// Global threshold level for the binary and color plans. Also centres
    /// the Canny thresholds in binary mode.
    #[serde(default = "TraceConfig::default_threshold")]
    pub threshold: f64,

    /// Whether to apply the 3x3 Gaussian pre-blur.
    #[serde(default = "TraceConfig::default_smooth")]
    pub smooth: bool,
}

impl TraceConfig {
    /// Default global threshold level.
    pub const DEFAULT_THRESHOLD: f64 = 80.0;

    /// Pre-blur is on unless disabled.
    pub const DEFAULT_SMOOTH: bool = true;

    /// Create a config with the required fields; the rest use defaults.
    #[must_use]
    pub const fn new(mode: ColorMode, min_area: f64, epsilon: f64) -> Self {
        Self {
            mode,
            min_area,
            epsilon,
            threshold: Self::DEFAULT_THRESHOLD,
            smooth: Self::DEFAULT_SMOOTH,
        }
    }

    const fn default_threshold() -> f64 {
        Self::DEFAULT_THRESHOLD
    }

    const fn default_smooth() -> bool {
        Self::DEFAULT_SMOOTH
    }

    /// Check the numeric fields.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when `minArea`, `epsilon`
    /// or `threshold` is not finite, or `epsilon` is negative.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let finite = [
            ("minArea", self.min_area),
            ("epsilon", self.epsilon),
            ("threshold", self.threshold),
        ];
        if let Some((key, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::InvalidConfig(format!(
                "{key} must be a finite number, got {value}"
            )));
        }
        if self.epsilon < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "epsilon must not be negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Counts collected for one segmentation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Threshold level the pass ran at.
    pub level: f64,
    /// Fill assigned to the pass's shapes.
    pub fill: Fill,
    /// Raw contours traced in the mask.
    pub found: usize,
    /// Of `found`, how many were hole borders.
    pub holes: usize,
    /// Contours that survived area and vertex filtering.
    pub kept: usize,
}

/// Result of tracing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Dimensions of the source image in pixels.
    ///
    /// The SVG writer uses these for `width`, `height` and `viewBox`.
    pub dimensions: Dimensions,

    /// Retained shapes in drawing order (pass order, then trace order).
    pub shapes: Vec<Shape>,

    /// One entry per segmentation pass, in execution order.
    pub passes: Vec<PassSummary>,
}

impl Trace {
    /// Total raw contours found across all passes.
    #[must_use]
    pub fn contours_found(&self) -> usize {
        self.passes.iter().map(|p| p.found).sum()
    }

    /// Total vertices across all retained shapes.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.shapes.iter().map(|s| s.polygon.len()).sum()
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Trace configuration is invalid.
    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),
}
