//! Blob store abstraction: whole-value documents with a version token

use crate::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored value together with its version token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedBlob {
    pub value: String,
    pub etag: String,
}

impl VersionedBlob {
    pub fn new(value: String) -> Self {
        let etag = compute_etag(&value);
        Self { value, etag }
    }
}

/// Precondition attached to a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// Overwrite whatever is stored
    Any,
    /// Only write if nothing is stored under the key yet
    Absent,
    /// Only write if the stored etag still matches
    Matches(String),
}

impl WriteCondition {
    /// Condition that holds only if the store still looks like `current`
    pub fn unchanged_since(current: Option<&VersionedBlob>) -> Self {
        match current {
            Some(blob) => Self::Matches(blob.etag.clone()),
            None => Self::Absent,
        }
    }
}

/// Key-value store holding whole string values.
///
/// Writes replace the full value atomically: a failed `put` leaves the prior
/// value untouched. A `put` whose condition does not hold returns
/// `StoreError::Conflict`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> StoreResult<Option<VersionedBlob>>;

    /// Write `value` under `key`, returning the new etag
    async fn put(&self, key: &str, value: String, condition: WriteCondition) -> StoreResult<String>;
}

/// Compute the version token of a stored value
pub fn compute_etag(value: &str) -> String {
    let hash = Sha256::digest(value.as_bytes());
    format!("{:x}", hash)
}
