//! Leaderboard store: read-modify-write of the ranked document
//!
//! Every submission reads the stored document with its etag, merges the new
//! entry, ranks, truncates and writes the whole document back on the
//! condition that nobody else wrote in between. A lost race is retried
//! against the fresh document, so concurrent submissions are never dropped
//! silently.

use crate::error::{LeaderboardError, LeaderboardResult};
use crate::ranking::{rank, validate_name, validate_score};
use crate::types::{ImportedEntry, LeaderboardConfig, ScoreEntry, Submission};
use chrono::Utc;
use persistence::{BlobStore, StoreError, VersionedBlob, WriteCondition};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Ranked top-N score list persisted as one JSON document in a `BlobStore`
pub struct LeaderboardStore {
    blobs: Arc<dyn BlobStore>,
    config: LeaderboardConfig,
}

impl LeaderboardStore {
    pub fn new(blobs: Arc<dyn BlobStore>, config: LeaderboardConfig) -> Self {
        Self { blobs, config }
    }

    /// Current ranked entries, empty if nothing was stored yet
    pub async fn get_top(&self) -> LeaderboardResult<Vec<ScoreEntry>> {
        let (board, _) = self.load().await?;
        Ok(board)
    }

    /// Current ranked entries plus the etag of the stored document
    pub async fn get_top_versioned(&self) -> LeaderboardResult<(Vec<ScoreEntry>, Option<String>)> {
        let (board, current) = self.load().await?;
        Ok((board, current.map(|blob| blob.etag)))
    }

    /// Record a new score and return the leaderboard as persisted
    pub async fn submit(&self, name: &str, score: f64) -> LeaderboardResult<Vec<ScoreEntry>> {
        self.submit_entry(name, score)
            .await
            .map(|submission| submission.board)
    }

    /// Record a new score and report where it landed
    pub async fn submit_entry(&self, name: &str, score: f64) -> LeaderboardResult<Submission> {
        validate_name(name)?;
        validate_score(score)?;

        let entry = ScoreEntry::new(name, score, Utc::now());
        let attempts = self.config.max_conflict_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let (mut board, current) = self.load().await?;
            board.push(entry.clone());
            rank(&mut board, self.config.capacity);

            let document = self.encode(&board)?;
            let condition = WriteCondition::unchanged_since(current.as_ref());

            match self.blobs.put(&self.config.key, document, condition).await {
                Ok(etag) => {
                    let placement = board.iter().position(|e| *e == entry);
                    info!(
                        name = %entry.name,
                        score = entry.score,
                        entries = board.len(),
                        ?placement,
                        attempt,
                        etag = %etag,
                        "Score submitted"
                    );
                    return Ok(Submission { board, placement });
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!(
                        name = %entry.name,
                        attempt,
                        max_attempts = attempts,
                        "Leaderboard changed during update, retrying"
                    );
                }
                Err(e) => {
                    error!(key = %self.config.key, "Failed to write leaderboard: {}", e);
                    return Err(e.into());
                }
            }
        }

        Err(LeaderboardError::Conflict { attempts })
    }

    /// Overwrite the whole leaderboard with `entries` (ranked and truncated first)
    pub async fn replace(&self, entries: Vec<ImportedEntry>) -> LeaderboardResult<Vec<ScoreEntry>> {
        for entry in &entries {
            validate_name(&entry.name)?;
            validate_score(entry.score)?;
        }

        let now = Utc::now();
        let mut board: Vec<ScoreEntry> = entries
            .into_iter()
            .map(|e| ScoreEntry::new(e.name, e.score, e.timestamp.unwrap_or(now)))
            .collect();
        let supplied = board.len();
        rank(&mut board, self.config.capacity);

        let document = self.encode(&board)?;
        self.blobs
            .put(&self.config.key, document, WriteCondition::Any)
            .await
            .map_err(|e| {
                error!(key = %self.config.key, "Failed to replace leaderboard: {}", e);
                LeaderboardError::from(e)
            })?;

        info!(supplied, kept = board.len(), "Leaderboard replaced");
        Ok(board)
    }

    /// Read and normalise the stored document
    async fn load(&self) -> LeaderboardResult<(Vec<ScoreEntry>, Option<VersionedBlob>)> {
        let current = self.blobs.get(&self.config.key).await.map_err(|e| {
            error!(key = %self.config.key, "Failed to read leaderboard: {}", e);
            LeaderboardError::from(e)
        })?;

        let mut board = match &current {
            Some(blob) => decode(blob)?,
            None => {
                debug!(key = %self.config.key, "No leaderboard stored yet");
                Vec::new()
            }
        };
        rank(&mut board, self.config.capacity);

        Ok((board, current))
    }

    fn encode(&self, board: &[ScoreEntry]) -> LeaderboardResult<String> {
        let result = if self.config.pretty_json {
            serde_json::to_string_pretty(board)
        } else {
            serde_json::to_string(board)
        };
        result.map_err(|e| LeaderboardError::StorageUnavailable(format!("encode failed: {e}")))
    }
}

fn decode(blob: &VersionedBlob) -> LeaderboardResult<Vec<ScoreEntry>> {
    serde_json::from_str(&blob.value).map_err(|e| {
        error!(etag = %blob.etag, "Stored leaderboard is not a valid document: {}", e);
        LeaderboardError::StorageUnavailable(format!("stored leaderboard is unreadable: {e}"))
    })
}
