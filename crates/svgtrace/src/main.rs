//! svgtrace: convert a raster image into a filled-path SVG.
//!
//! Reads an image, traces region boundaries in the colour mode chosen by
//! the JSON parameter object, and writes one filled `<path>` per retained
//! shape. Progress and a machine-readable `STATS:` line go to stdout.
//!
//! # Usage
//!
//! ```text
//! svgtrace <input_image> <output_svg> <params_json>
//! svgtrace photo.png out.svg '{"colorMode":"binary","minArea":10,"epsilon":1}'
//! ```
//!
//! Diagnostics are logged to stderr through `tracing`; set `RUST_LOG`
//! (for example `RUST_LOG=debug`) to see them.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use svgtrace_export::SvgDocument;
use svgtrace_pipeline::{PipelineError, TraceConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Printed to stdout when the arguments cannot be parsed.
const USAGE: &str = "Usage: svgtrace <input_image> <output_svg> <params_json>";

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Convert a raster image into a filled-path SVG.
///
/// The parameter object takes `colorMode` ("binary", "grayscale" or
/// "color"), `minArea` and `epsilon`, plus optional `threshold`
/// (default 80) and `smooth` (default true).
#[derive(Parser, Debug)]
#[command(name = "svgtrace", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    #[arg(allow_hyphen_values = true)]
    input_image: String,

    /// Path the SVG is written to.
    #[arg(allow_hyphen_values = true)]
    output_svg: String,

    /// Trace parameters as a JSON object.
    #[arg(allow_hyphen_values = true)]
    params_json: String,
}

impl Cli {
    /// Strip shell-quoting leftovers: `"` around paths, `'` around JSON.
    fn unquoted(&self) -> (&str, &str, &str) {
        (
            self.input_image.trim_matches('"'),
            self.output_svg.trim_matches('"'),
            self.params_json.trim_matches('\''),
        )
    }
}

/// Everything that can make a conversion fail.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// The parameter JSON is malformed, misses a key or has a bad value type.
    #[error("Invalid parameters: {0}")]
    Params(#[from] serde_json::Error),

    /// The parameters parsed but are out of range.
    #[error("Invalid parameters: {0}")]
    InvalidParams(#[source] PipelineError),

    /// The input could not be read or decoded.
    #[error("Could not read image: {path} ({source})")]
    ReadImage {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Tracing failed after the image was loaded.
    #[error(transparent)]
    Pipeline(PipelineError),

    /// The output document could not be written.
    #[error("Could not write SVG: {path} ({source})")]
    WriteSvg {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let Ok(cli) = Cli::try_parse() else {
        println!("{USAGE}");
        return ExitCode::FAILURE;
    };

    init_tracing();

    let (input, output, params) = cli.unquoted();
    match run(input, output, params) {
        Ok(()) => {
            println!("Conversion completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber, filtered by `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Parse parameters, trace the image, write the SVG and print the summary.
fn run(input: &str, output: &str, params: &str) -> Result<(), CliError> {
    let config = parse_params(params)?;
    debug!(?config, "parsed parameters");

    let read_error = |source: Box<dyn std::error::Error + Send + Sync>| CliError::ReadImage {
        path: input.to_owned(),
        source,
    };
    let bytes = std::fs::read(input).map_err(|e| read_error(Box::new(e)))?;
    let image = svgtrace_pipeline::grayscale::decode(&bytes).map_err(|e| read_error(Box::new(e)))?;

    println!("Processing image: {}x{}", image.width(), image.height());
    println!("Mode: {}", config.mode);

    let trace = svgtrace_pipeline::trace_image(&image, &config).map_err(CliError::Pipeline)?;
    for pass in &trace.passes {
        debug!(
            level = pass.level,
            fill = %pass.fill,
            found = pass.found,
            holes = pass.holes,
            kept = pass.kept,
            "pass summary"
        );
    }
    println!("Found {} contours", trace.contours_found());
    println!("Kept {} contours after filtering", trace.shapes.len());

    let SvgDocument { svg, stats } = svgtrace_export::to_svg(&trace);
    write_atomically(Path::new(output), &svg).map_err(|source| CliError::WriteSvg {
        path: output.to_owned(),
        source,
    })?;
    info!(path = output, bytes = svg.len(), "wrote SVG");

    println!("STATS:contours={},points={}", stats.contours, stats.points);
    Ok(())
}

/// Deserialize and validate the parameter object.
fn parse_params(params: &str) -> Result<TraceConfig, CliError> {
    let config: TraceConfig = serde_json::from_str(params)?;
    config.validate().map_err(CliError::InvalidParams)?;
    Ok(config)
}

/// Mode requested for the output file before the umask applies, as for a
/// file created with `File::create`.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o666;

/// Write `contents` to a temporary file next to `path`, then rename it
/// over `path`. The target is either fully replaced or left untouched.
fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        builder.permissions(std::fs::Permissions::from_mode(OUTPUT_MODE));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
