//! Leaderboard engine: ranked top-N score list over a blob store
//!
//! Provides:
//! - Score entry and configuration types
//! - Pure ranking helpers (stable sort + truncate)
//! - `LeaderboardStore`, the read-modify-write component with optimistic
//!   concurrency against any `persistence::BlobStore`

pub mod error;
pub mod ranking;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use error::{LeaderboardError, LeaderboardResult};
pub use ranking::{rank, validate_name, validate_score};
pub use store::LeaderboardStore;
pub use types::*;
