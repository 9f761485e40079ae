//! svgtrace-export: Pure SVG serializer (sans-IO)
//!
//! Converts a traced set of filled shapes into an SVG document string and
//! reports the counts printed alongside it.

pub mod svg;

pub use svg::{Stats, SvgDocument, path_data, shapes_to_svg, to_svg};
