//! In-memory blob store with fault injection, used for tests and `memory` mode

use crate::blob::{BlobStore, VersionedBlob, WriteCondition};
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local blob store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, VersionedBlob>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail with `StoreError::Unavailable`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent `put` fail with `StoreError::Unavailable`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<VersionedBlob>> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(format!("read of {key} failed")));
        }
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String, condition: WriteCondition) -> StoreResult<String> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(format!("write of {key} failed")));
        }

        let mut blobs = self.blobs.write().await;
        let holds = match (&condition, blobs.get(key)) {
            (WriteCondition::Any, _) => true,
            (WriteCondition::Absent, existing) => existing.is_none(),
            (WriteCondition::Matches(etag), Some(existing)) => existing.etag == *etag,
            (WriteCondition::Matches(_), None) => false,
        };
        if !holds {
            debug!(key, ?condition, "Conditional write rejected");
            return Err(StoreError::Conflict {
                key: key.to_string(),
            });
        }

        let blob = VersionedBlob::new(value);
        let etag = blob.etag.clone();
        blobs.insert(key.to_string(), blob);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(etag)
    }
}
