//! svgtrace-pipeline: Pure raster-to-polygon pipeline (sans-IO).
//!
//! Converts raster images into filled, simplified polygons through:
//! decode -> optional blur -> per-mode segmentation passes (equalize,
//! threshold, edges, morphology) -> contour tracing -> area filter ->
//! Douglas-Peucker simplification.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Reading and writing files
//! lives in the `svgtrace` binary.

pub mod blur;
pub mod contour;
pub mod edge;
pub mod grayscale;
pub mod morphology;
pub mod segment;
pub mod simplify;
pub mod threshold;
pub mod types;

use tracing::{debug, info};

pub use types::{
    ColorMode, Dimensions, Fill, GrayImage, PassSummary, PipelineError, Point, Polygon, RgbImage,
    Shape, Trace, TraceConfig,
};

/// Run the full pipeline on encoded image bytes.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// then produces a [`Trace`] holding the retained shapes in drawing
/// order, per-pass counts, and the source image dimensions. The
/// dimensions are needed by export serializers to size the document.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Decode the image to 8-bit RGB
/// 3. Optional 3x3 Gaussian blur
/// 4. Segmentation passes for the configured colour mode
/// 5. Contour tracing, area filtering and simplification per pass
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the configuration fails
/// [`TraceConfig::validate`].
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(image_bytes: &[u8], config: &TraceConfig) -> Result<Trace, PipelineError> {
    config.validate()?;
    let image = grayscale::decode(image_bytes)?;
    debug!(width = image.width(), height = image.height(), "decoded image");
    trace_image(&image, config)
}

/// Run the pipeline on an already decoded image.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the configuration fails
/// [`TraceConfig::validate`].
pub fn trace_image(image: &RgbImage, config: &TraceConfig) -> Result<Trace, PipelineError> {
    config.validate()?;

    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };

    let smoothed;
    let source = if config.smooth {
        smoothed = blur::smooth(image);
        &smoothed
    } else {
        image
    };

    let mut shapes = Vec::new();
    let mut passes = Vec::new();
    for output in segment::segment(source, config) {
        shapes.extend(output.shapes);
        passes.push(output.summary);
    }

    let trace = Trace {
        dimensions,
        shapes,
        passes,
    };
    info!(
        mode = %config.mode,
        found = trace.contours_found(),
        kept = trace.shapes.len(),
        points = trace.point_count(),
        "trace complete"
    );
    Ok(trace)
}
