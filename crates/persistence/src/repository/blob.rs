//! Blob repository: whole-value documents with conditional writes

use crate::blob::{compute_etag, VersionedBlob, WriteCondition};
use crate::{StoreError, StoreResult};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

/// A persisted blob row
#[derive(Debug, Clone, FromRow)]
pub struct BlobRecord {
    pub key: String,
    pub value: String,
    pub etag: String,
    pub updated_at: Option<i64>,
}

impl From<BlobRecord> for VersionedBlob {
    fn from(record: BlobRecord) -> Self {
        Self {
            value: record.value,
            etag: record.etag,
        }
    }
}

/// Repository for the `blobs` table
pub struct BlobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BlobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the blob stored under `key`
    pub async fn get(&self, key: &str) -> StoreResult<Option<VersionedBlob>> {
        let record = sqlx::query_as::<_, BlobRecord>(
            "SELECT key, value, etag, updated_at FROM blobs WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(record.map(VersionedBlob::from))
    }

    /// Write `value` under `key` if `condition` holds. Returns the new etag.
    ///
    /// Each branch is a single statement, so the check and the write are
    /// atomic with respect to other connections.
    pub async fn put(
        &self,
        key: &str,
        value: &str,
        condition: &WriteCondition,
    ) -> StoreResult<String> {
        let etag = compute_etag(value);

        let result = match condition {
            WriteCondition::Any => {
                sqlx::query(
                    r#"INSERT INTO blobs (key, value, etag, updated_at)
                       VALUES (?1, ?2, ?3, strftime('%s', 'now'))
                       ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         etag = excluded.etag,
                         updated_at = excluded.updated_at
                    "#,
                )
                .bind(key)
                .bind(value)
                .bind(&etag)
                .execute(self.pool)
                .await?
            }
            WriteCondition::Absent => {
                sqlx::query(
                    r#"INSERT INTO blobs (key, value, etag, updated_at)
                       VALUES (?1, ?2, ?3, strftime('%s', 'now'))
                       ON CONFLICT(key) DO NOTHING
                    "#,
                )
                .bind(key)
                .bind(value)
                .bind(&etag)
                .execute(self.pool)
                .await?
            }
            WriteCondition::Matches(expected) => {
                sqlx::query(
                    r#"UPDATE blobs
                       SET value = ?2, etag = ?3, updated_at = strftime('%s', 'now')
                       WHERE key = ?1 AND etag = ?4
                    "#,
                )
                .bind(key)
                .bind(value)
                .bind(&etag)
                .bind(expected)
                .execute(self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            debug!(key, ?condition, "Conditional write rejected");
            return Err(StoreError::Conflict {
                key: key.to_string(),
            });
        }

        Ok(etag)
    }
}
