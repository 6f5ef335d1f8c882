//! Persistence layer for the leaderboard service
//!
//! Provides the `BlobStore` abstraction (whole-value get/put under a key, with
//! a content version token) plus a SQLite-backed and an in-memory store.

pub mod blob;
pub mod memory;
pub mod repository;
pub mod schema;

pub use blob::{compute_etag, BlobStore, VersionedBlob, WriteCondition};
pub use memory::MemoryBlobStore;
pub use sqlx::sqlite::SqlitePool;

use async_trait::async_trait;
use repository::BlobRepository;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The conditional write did not match the stored version
    #[error("Write conflict on key {key}")]
    Conflict { key: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) a SQLite database file
    pub async fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let options = Self::connect_options(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            // WAL mode: readers are not blocked by the single writer
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(Self::connect_options("sqlite::memory:")?)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Per-connection settings, applied to every connection the pool opens
    fn connect_options(url: &str) -> StoreResult<SqliteConnectOptions> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Connection(format!("{e}: {url}")))?
            .synchronous(SqliteSynchronous::Normal)
            // Wait for a competing writer instead of failing with SQLITE_BUSY
            .busy_timeout(Duration::from_secs(5));

        Ok(options)
    }

    /// Run database migrations (execute each statement individually)
    async fn run_migrations(&self) -> StoreResult<()> {
        for statement in schema::CREATE_TABLES.split(';') {
            // Strip comment-only lines, then check if any SQL remains
            let sql: String = statement
                .lines()
                .filter(|line| !line.trim().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");
            let sql = sql.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Migration(format!("{e}: {sql}")))?;
        }

        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl BlobStore for Database {
    async fn get(&self, key: &str) -> StoreResult<Option<VersionedBlob>> {
        BlobRepository::new(&self.pool).get(key).await
    }

    async fn put(&self, key: &str, value: String, condition: WriteCondition) -> StoreResult<String> {
        BlobRepository::new(&self.pool)
            .put(key, &value, &condition)
            .await
    }
}
