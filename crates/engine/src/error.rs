//! Errors surfaced by the leaderboard engine

use persistence::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeaderboardError {
    /// Missing or malformed name/score. Nothing was written.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The blob store read or write failed, or the stored document is unreadable
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Other writers kept winning the conditional write
    #[error("Leaderboard update conflicted {attempts} times")]
    Conflict { attempts: u32 },
}

pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}
