//! SVG export serializer.
//!
//! Converts traced shapes into an SVG string with one filled `<path>`
//! element per shape. Each path is a closed polygon written with `M`
//! (move to), `L` (line to) and `Z` (close path) commands, separated by
//! spaces: `M 0 0 L 10 0 L 10 10 Z`.
//!
//! The document is assembled with plain formatting so the attribute order
//! and number spelling are fixed: coordinates use Rust's shortest `f64`
//! representation, which prints integral values without a fraction.
//!
//! This is a pure function with no I/O -- it returns a `String` together
//! with the counts of what was written.

use std::fmt::Write;

use svgtrace_pipeline::{Dimensions, Polygon, Shape, Trace};

/// Counts describing an emitted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of `<path>` elements written.
    pub contours: usize,
    /// Vertices summed over those paths.
    pub points: usize,
}

/// A serialized SVG document and the counts of its paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    /// Complete document text, LF line endings, trailing newline.
    pub svg: String,
    /// Counts of the `<path>` elements in `svg`.
    pub stats: Stats,
}

/// Build an SVG path `d` attribute string from a closed polygon.
///
/// Every coordinate is multiplied by its scale factor before formatting.
/// Returns an empty string for polygons with fewer than 3 vertices.
///
/// # Examples
///
/// ```
/// use svgtrace_pipeline::{Point, Polygon};
/// use svgtrace_export::path_data;
///
/// let triangle = Polygon::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
///     Point::new(10.0, 40.0),
/// ]);
/// assert_eq!(path_data(&triangle, 1.0, 1.0), "M 10 20 L 30 40 L 10 40 Z");
/// ```
#[must_use]
pub fn path_data(polygon: &Polygon, scale_x: f64, scale_y: f64) -> String {
    let points = polygon.points();
    if points.len() < 3 {
        return String::new();
    }

    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let _ = write!(d, "{cmd} {} {}", p.x * scale_x, p.y * scale_y);
    }
    d.push_str(" Z");
    d
}

/// Escape the five XML special characters for safe embedding in
/// attribute values.
///
/// Handles `&` (must be first), `<`, `>`, `"`, and `'`.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Write the XML declaration and the opening `<svg>` tag.
fn write_svg_preamble(out: &mut String, dimensions: Dimensions) {
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
        w = dimensions.width,
        h = dimensions.height,
    );
}

/// Serialize shapes into a standalone SVG document.
///
/// Shapes are written in order, one `<path>` each with `fill` set to the
/// shape's colour and `stroke="none"`. A shape whose path data comes out
/// empty is skipped and not counted.
#[must_use]
pub fn shapes_to_svg(shapes: &[Shape], dimensions: Dimensions) -> SvgDocument {
    let mut svg = String::new();
    let mut stats = Stats::default();
    write_svg_preamble(&mut svg, dimensions);

    for shape in shapes {
        let d = path_data(&shape.polygon, 1.0, 1.0);
        if d.is_empty() {
            continue;
        }
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="{}" stroke="none"/>"#,
            xml_escape(&d),
            xml_escape(&shape.fill.to_string()),
        );
        stats.contours += 1;
        stats.points += shape.polygon.len();
    }

    svg.push_str("</svg>\n");
    SvgDocument { svg, stats }
}

/// Serialize a pipeline [`Trace`] into an SVG document sized to the
/// source image.
#[must_use]
pub fn to_svg(trace: &Trace) -> SvgDocument {
    shapes_to_svg(&trace.shapes, trace.dimensions)
}
