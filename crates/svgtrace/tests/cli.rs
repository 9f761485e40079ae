//! Integration tests: drive the compiled `svgtrace` binary end to end.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const BINARY_PARAMS: &str = r#"{"colorMode":"binary","minArea":0,"epsilon":1}"#;

fn svgtrace(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_svgtrace"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn svgtrace")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_png(dir: &Path, name: &str, img: &image::RgbImage) -> PathBuf {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgb8,
    )
    .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, buf).unwrap();
    path
}

fn solid_png(dir: &Path) -> PathBuf {
    write_png(
        dir,
        "solid.png",
        &image::RgbImage::from_pixel(24, 18, image::Rgb([120, 60, 200])),
    )
}

fn scene_png(dir: &Path) -> PathBuf {
    let img = image::RgbImage::from_fn(64, 48, |x, y| {
        if (10..30).contains(&x) && (8..36).contains(&y) {
            image::Rgb([25, 30, 140])
        } else if (40..56).contains(&x) && (20..40).contains(&y) {
            image::Rgb([190, 40, 30])
        } else {
            image::Rgb([235, 235, 225])
        }
    });
    write_png(dir, "scene.png", &img)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Pull `contours` and `points` out of the `STATS:` line.
fn parse_stats(out: &str) -> (usize, usize) {
    let line = out
        .lines()
        .find(|l| l.starts_with("STATS:"))
        .expect("no STATS line");
    let mut contours = None;
    let mut points = None;
    for field in line.trim_start_matches("STATS:").split(',') {
        match field.split_once('=') {
            Some(("contours", v)) => contours = Some(v.parse().unwrap()),
            Some(("points", v)) => points = Some(v.parse().unwrap()),
            _ => panic!("unexpected STATS field {field:?}"),
        }
    }
    (contours.unwrap(), points.unwrap())
}

/// Count `<path>` elements and the vertices in their `d` attributes.
fn count_paths(svg: &str) -> (usize, usize) {
    let mut paths = 0;
    let mut vertices = 0;
    for line in svg.lines().filter(|l| l.contains("<path ")) {
        paths += 1;
        let d = line.split("d=\"").nth(1).unwrap().split('"').next().unwrap();
        vertices += d.split(' ').filter(|t| *t == "M" || *t == "L").count();
    }
    (paths, vertices)
}

#[test]
fn wrong_argument_count_prints_usage() {
    for args in [&[][..], &["only.png"][..], &["a", "b", "c", "d"][..]] {
        let output = svgtrace(args);
        assert_eq!(output.status.code(), Some(1), "args {args:?}");
        assert!(
            stdout(&output).contains("Usage: svgtrace <input_image> <output_svg> <params_json>"),
            "args {args:?}: {}",
            stdout(&output)
        );
    }
}

#[test]
fn help_and_version_flags_count_as_wrong_arguments() {
    for flag in ["--help", "-h", "--version", "-V"] {
        let output = svgtrace(&[flag]);
        assert_eq!(output.status.code(), Some(1), "{flag}");
        assert_eq!(
            stdout(&output).trim_end(),
            "Usage: svgtrace <input_image> <output_svg> <params_json>",
            "{flag}"
        );
    }
}

#[test]
fn binary_solid_image_writes_one_quadrilateral() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");

    let output = svgtrace(&[path_str(&input), path_str(&output_svg), BINARY_PARAMS]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            "Processing image: 24x18",
            "Mode: binary",
            "Found 1 contours",
            "Kept 1 contours after filtering",
            "STATS:contours=1,points=4",
            "Conversion completed successfully",
        ]
    );
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));

    let svg = std::fs::read_to_string(&output_svg).unwrap();
    assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(svg.contains(r#"<svg width="24" height="18" viewBox="0 0 24 18""#));
    assert!(svg.contains(r##"fill="#000000" stroke="none"/>"##));
    assert!(svg.contains(" Z\""));
    assert_eq!(count_paths(&svg), (1, 4));
}

#[test]
fn stats_line_matches_written_file_in_every_mode() {
    let dir = TempDir::new().unwrap();
    let input = scene_png(dir.path());
    for mode in ["binary", "grayscale", "color"] {
        let output_svg = dir.path().join(format!("{mode}.svg"));
        let params = format!(r#"{{"colorMode":"{mode}","minArea":6,"epsilon":0.8}}"#);
        let output = svgtrace(&[path_str(&input), path_str(&output_svg), &params]);
        assert!(output.status.success(), "{mode}: {}", stderr(&output));

        let out = stdout(&output);
        assert!(out.contains(&format!("Mode: {mode}")));
        let svg = std::fs::read_to_string(&output_svg).unwrap();
        assert_eq!(parse_stats(&out), count_paths(&svg), "{mode}");
    }
}

#[test]
fn reruns_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let input = scene_png(dir.path());
    let first = dir.path().join("first.svg");
    let second = dir.path().join("second.svg");
    let params = r#"{"colorMode":"grayscale","minArea":3,"epsilon":0.5,"threshold":100}"#;

    assert!(svgtrace(&[path_str(&input), path_str(&first), params]).status.success());
    assert!(svgtrace(&[path_str(&input), path_str(&second), params]).status.success());
    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[cfg(unix)]
#[test]
fn output_file_mode_matches_a_plain_write() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");
    let plain = dir.path().join("plain.svg");
    std::fs::write(&plain, "x").unwrap();

    let output = svgtrace(&[path_str(&input), path_str(&output_svg), BINARY_PARAMS]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&output_svg), mode(&plain));
}

#[test]
fn quoting_leftovers_are_stripped() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("quoted.svg");

    let output = svgtrace(&[
        &format!("\"{}\"", path_str(&input)),
        &format!("\"{}\"", path_str(&output_svg)),
        &format!("'{BINARY_PARAMS}'"),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output_svg.exists());
}

#[test]
fn missing_required_keys_are_named() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");

    for (params, key) in [
        (r#"{"minArea":0,"epsilon":1}"#, "colorMode"),
        (r#"{"colorMode":"binary","epsilon":1}"#, "minArea"),
        (r#"{"colorMode":"binary","minArea":0}"#, "epsilon"),
    ] {
        let output = svgtrace(&[path_str(&input), path_str(&output_svg), params]);
        assert_eq!(output.status.code(), Some(1), "{params}");
        let err = stderr(&output);
        assert!(err.starts_with("Error: "), "{err}");
        assert!(err.contains(key), "expected {key} in {err}");
    }
    assert!(!output_svg.exists());
}

#[test]
fn threshold_alone_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");

    let output = svgtrace(&[path_str(&input), path_str(&output_svg), r#"{"threshold":80}"#]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error:"));
}

#[test]
fn malformed_json_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");

    let output = svgtrace(&[path_str(&input), path_str(&output_svg), "{colorMode: binary"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("Error: Invalid parameters: "), "{err}");
    assert!(err.contains("line 1"), "expected a JSON parse position in {err}");
}

#[test]
fn unknown_color_mode_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");

    let output = svgtrace(&[
        path_str(&input),
        path_str(&output_svg),
        r#"{"colorMode":"sepia","minArea":0,"epsilon":1}"#,
    ]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("unknown variant"), "{err}");
    assert!(err.contains("sepia"), "{err}");
}

#[test]
fn negative_epsilon_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("out.svg");

    let output = svgtrace(&[
        path_str(&input),
        path_str(&output_svg),
        r#"{"colorMode":"binary","minArea":0,"epsilon":-2}"#,
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("epsilon"));
}

#[test]
fn missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("does-not-exist.png");
    let output_svg = dir.path().join("out.svg");

    let output = svgtrace(&[path_str(&input), path_str(&output_svg), BINARY_PARAMS]);
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("Error: Could not read image"),
        "{}",
        stderr(&output)
    );
    assert!(!output_svg.exists());
}

#[test]
fn undecodable_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let output_svg = dir.path().join("out.svg");
    for (name, bytes) in [("empty.png", &b""[..]), ("text.png", &b"not an image"[..])] {
        let input = dir.path().join(name);
        std::fs::write(&input, bytes).unwrap();
        let output = svgtrace(&[path_str(&input), path_str(&output_svg), BINARY_PARAMS]);
        assert_eq!(output.status.code(), Some(1), "{name}");
        assert!(
            stderr(&output).contains("Error: Could not read image"),
            "{name}: {}",
            stderr(&output)
        );
    }
}

#[test]
fn unwritable_output_keeps_previous_file() {
    let dir = TempDir::new().unwrap();
    let input = solid_png(dir.path());
    let output_svg = dir.path().join("missing-dir").join("out.svg");

    let output = svgtrace(&[path_str(&input), path_str(&output_svg), BINARY_PARAMS]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Could not write SVG"));
    assert!(!stdout(&output).contains("STATS:"));
}
