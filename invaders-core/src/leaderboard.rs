//! High score storage.
//!
//! The wire types match the hosted score service: scores are submitted as
//! `{"name": ..., "score": ...}` and the top ten come back as a list of
//! `{"Name": ..., "Score": ..., "CreatedAt": ...}` records.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Names shorter than this are not saved.
pub const MIN_NAME_LEN: usize = 3;
/// Number of scores shown on the leaderboard.
pub const TOP: usize = 10;

/// A saved score.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserScore {
    pub name: String,
    pub score: u32,
    /// RFC 3339 timestamp assigned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A score submission.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AddScore {
    pub name: String,
    pub score: u32,
}

/// Somewhere to keep high scores.
pub trait Leaderboard: fmt::Debug {
    /// Save a score.
    fn add_score(&mut self, name: &str, score: u32) -> Result<(), Error>;

    /// The best scores, highest first.
    fn top10(&mut self) -> Result<Vec<UserScore>, Error>;
}

/// Scores kept in memory, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct LocalLeaderboard {
    scores: Vec<UserScore>,
    path: Option<PathBuf>,
}

impl LocalLeaderboard {
    /// A leaderboard that forgets everything on exit.
    pub fn new() -> LocalLeaderboard {
        LocalLeaderboard::default()
    }

    /// A leaderboard stored at `path`. A missing file is an empty leaderboard.
    pub fn open(path: impl Into<PathBuf>) -> Result<LocalLeaderboard, Error> {
        let path = path.into();
        let scores: Vec<UserScore> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        debug!("Loaded {} scores from {}", scores.len(), path.display());

        let mut leaderboard = LocalLeaderboard {
            scores,
            path: Some(path),
        };
        leaderboard.sort();

        Ok(leaderboard)
    }

    fn sort(&mut self) {
        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
    }

    fn save(&self) -> Result<(), Error> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_vec_pretty(&self.scores)?)?;
        }

        Ok(())
    }
}

impl Leaderboard for LocalLeaderboard {
    fn add_score(&mut self, name: &str, score: u32) -> Result<(), Error> {
        let request = AddScore {
            name: name.trim().to_string(),
            score,
        };
        if request.name.chars().count() < MIN_NAME_LEN {
            return Err(Error::Leaderboard(format!(
                "name must have at least {} characters",
                MIN_NAME_LEN
            )));
        }

        info!("Saving score {} for {}", request.score, request.name);
        self.scores.push(UserScore {
            name: request.name,
            score: request.score,
            created_at: None,
        });
        self.sort();

        self.save()
    }

    fn top10(&mut self) -> Result<Vec<UserScore>, Error> {
        Ok(self.scores.iter().take(TOP).cloned().collect())
    }
}
