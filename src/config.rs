//! Start-up settings read from the environment.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Settings that can change without a rebuild.
#[derive(Debug, PartialEq)]
pub(crate) struct Config {
    /// Draw hitboxes (`DEBUG`).
    pub(crate) debug: bool,
    /// Root directory for images (`INVADERS_ASSETS`).
    pub(crate) assets: PathBuf,
    /// Initial window scale (`INVADERS_SCALE`).
    pub(crate) scale: f64,
    /// Where to keep high scores (`INVADERS_SCORES`). Scores are not kept without it.
    pub(crate) scores: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("INVADERS_SCALE must be a positive number, got `{0}`")]
    Scale(String),
}

impl Config {
    pub(crate) fn from_env() -> Result<Config, ConfigError> {
        Config::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Enable debug mode with `DEBUG=true` environment variable
        let debug = var("DEBUG")
            .unwrap_or_else(|| "false".to_string())
            .parse()
            .unwrap_or(false);

        let assets = var("INVADERS_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets"));

        let scale = match var("INVADERS_SCALE") {
            Some(value) => match value.parse::<f64>() {
                Ok(scale) if scale.is_finite() && scale > 0.0 => scale,
                _ => return Err(ConfigError::Scale(value)),
            },
            None => 2.0,
        };

        let scores = var("INVADERS_SCORES").map(PathBuf::from);

        Ok(Config {
            debug,
            assets,
            scale,
            scores,
        })
    }
}
