//! Database schema definitions

/// SQL to create all tables
/// NOTE: `etag` is the SHA-256 hex digest of `value`, used for conditional writes
pub const CREATE_TABLES: &str = r#"
-- Whole-value blobs keyed by name (one row per document)
CREATE TABLE IF NOT EXISTS blobs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    etag TEXT NOT NULL,
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
)
"#;
