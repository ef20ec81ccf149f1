use std::path::PathBuf;
use thiserror::Error;

/// All the ways in which building or running the game can fail.
#[derive(Error, Debug)]
pub enum Error {
    /// A sprite or formation was constructed with unusable parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The accelerated easing step is undefined or would overshoot the target.
    #[error("Degenerate easing step")]
    DegenerateEasing,
    /// An image asset could not be decoded or encoded.
    #[error("Image error in `{path}`")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Equivalent to [`std::io::Error`]
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    /// Equivalent to [`serde_json::Error`]
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    /// The leaderboard refused a request.
    #[error("Leaderboard error: {0}")]
    Leaderboard(String),
}
