//! Types for the leaderboard engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default storage key of the leaderboard document
pub const DEFAULT_LEADERBOARD_KEY: &str = "leaderboardData";

/// Default number of entries kept
pub const DEFAULT_CAPACITY: usize = 10;

/// A single ranked score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: f64,
    /// Set by the server when the score is submitted
    pub timestamp: DateTime<Utc>,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            score,
            timestamp,
        }
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// The leaderboard as persisted
    pub board: Vec<ScoreEntry>,
    /// Zero-based position of the new entry, `None` if it did not make the cut
    pub placement: Option<usize>,
}

/// An entry supplied for a wholesale replace; the timestamp is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedEntry {
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Configuration for a leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Blob store key holding the document
    pub key: String,
    /// Maximum number of entries kept (top-N)
    pub capacity: usize,
    /// Extra attempts after a conditional write loses to another writer
    pub max_conflict_retries: u32,
    /// Pretty-print the stored JSON document
    pub pretty_json: bool,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_LEADERBOARD_KEY.to_string(),
            capacity: DEFAULT_CAPACITY,
            max_conflict_retries: 5,
            pretty_json: false,
        }
    }
}
