//! Shrink source artwork to the sizes the game draws it at.
//!
//! Reads a JSON manifest of `{"path", "width", "height"}` entries, scales each image to fit its
//! box and writes the result as PNG with the source prefix stripped from its path.

#![deny(clippy::all)]
#![forbid(unsafe_code)]

use error_iter::ErrorIter as _;
use invaders_core::{load_image, rescale_to_fit, Error};
use log::{error, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PREFIX: &str = "internal/";

/// One image to resize.
#[derive(Debug, Deserialize, PartialEq)]
struct Entry {
    path: String,
    width: u32,
    height: u32,
}

fn usage() -> String {
    "Usage: cargo run -p image-resizer -- <manifest.json> [strip_prefix]\nExample: cargo run -p image-resizer -- assets/resize.json internal/".to_string()
}

fn main() -> Result<(), String> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        return Err(usage());
    }

    let manifest = PathBuf::from(&args[1]);
    let prefix = args.get(2).map_or(DEFAULT_PREFIX, String::as_str);

    let entries = read_manifest(&manifest)
        .map_err(|err| format!("Cannot read {}: {}", manifest.display(), err))?;

    let mut resized = 0;
    for entry in &entries {
        match resize(entry, prefix, Path::new(".")) {
            Ok(output) => {
                info!("Resized {} to {}", entry.path, output.display());
                resized += 1;
            }
            Err(err) => log_error(&entry.path, &err),
        }
    }

    info!("Resized {} of {} images", resized, entries.len());

    Ok(())
}

fn read_manifest(path: &Path) -> Result<Vec<Entry>, Error> {
    let json = fs::read(path)?;

    Ok(serde_json::from_slice(&json)?)
}

/// Where the resized copy of `path` is written.
fn output_path(path: &str, prefix: &str) -> PathBuf {
    PathBuf::from(path.strip_prefix(prefix).unwrap_or(path))
}

/// Resize one image into `out_dir`, creating folders as needed.
fn resize(entry: &Entry, prefix: &str, out_dir: &Path) -> Result<PathBuf, Error> {
    let image = load_image(Path::new(&entry.path))?;
    let rescaled = rescale_to_fit(&image, entry.width, entry.height);

    let output = out_dir.join(output_path(&entry.path, prefix));
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    rescaled.save(&output).map_err(|source| Error::Image {
        path: output.clone(),
        source,
    })?;

    Ok(output)
}

fn log_error<E: std::error::Error + 'static>(path: &str, err: &E) {
    error!("{path}: {err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn strips_prefix() {
        assert_eq!(
            output_path("internal/images/lost.png", "internal/"),
            PathBuf::from("images/lost.png")
        );
        assert_eq!(
            output_path("images/lost.png", "internal/"),
            PathBuf::from("images/lost.png")
        );
    }

    #[test]
    fn parses_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("resize.json");
        fs::write(
            &manifest,
            r#"[{"path": "internal/images/youwon.png", "width": 640, "height": 480}]"#,
        )
        .unwrap();

        let entries = read_manifest(&manifest).unwrap();
        assert_eq!(
            entries,
            vec![Entry {
                path: "internal/images/youwon.png".into(),
                width: 640,
                height: 480,
            }]
        );
    }

    #[test]
    fn resizes_into_stripped_folder() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("internal/Ships/ship.png");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(80, 40, Rgba([1, 2, 3, 255]))
            .save(&source)
            .unwrap();

        let prefix = format!("{}/internal/", dir.path().display());
        let entry = Entry {
            path: source.display().to_string(),
            width: 40,
            height: 40,
        };
        let out_dir = dir.path().join("out");
        let output = resize(&entry, &prefix, &out_dir).unwrap();

        assert_eq!(output, out_dir.join("Ships/ship.png"));
        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (40, 20));
    }

    #[test]
    fn missing_image_is_an_error() {
        let entry = Entry {
            path: "does/not/exist.png".into(),
            width: 10,
            height: 10,
        };

        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            resize(&entry, DEFAULT_PREFIX, dir.path()),
            Err(Error::Image { .. })
        ));
        assert!(!dir.path().join("does").exists());
    }
}
