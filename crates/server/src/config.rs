//! Environment-driven server configuration

use anyhow::{anyhow, bail, Context};
use engine::LeaderboardConfig;
use std::path::PathBuf;

/// Which blob store backs the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub storage: StorageBackend,
    pub db_path: String,
    /// Directory served for non-API paths, if it exists
    pub static_dir: Option<PathBuf>,
    /// Enables POST /api/update-leaderboard
    pub allow_replace: bool,
    pub leaderboard: LeaderboardConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let storage = match lookup("LEADERBOARD_STORAGE")
            .unwrap_or_else(|| "sqlite".to_string())
            .to_lowercase()
            .as_str()
        {
            "sqlite" => StorageBackend::Sqlite,
            "memory" => StorageBackend::Memory,
            other => bail!("LEADERBOARD_STORAGE must be 'sqlite' or 'memory', got '{}'", other),
        };

        let db_path =
            lookup("LEADERBOARD_DB_PATH").unwrap_or_else(|| "data/leaderboard.db".to_string());

        let mut leaderboard = LeaderboardConfig::default();
        if let Some(key) = lookup("LEADERBOARD_KEY") {
            if key.trim().is_empty() {
                bail!("LEADERBOARD_KEY must not be empty");
            }
            leaderboard.key = key;
        }
        if let Some(capacity) = lookup("LEADERBOARD_CAPACITY") {
            leaderboard.capacity = capacity
                .parse()
                .with_context(|| format!("invalid LEADERBOARD_CAPACITY '{}'", capacity))?;
            if leaderboard.capacity == 0 {
                bail!("LEADERBOARD_CAPACITY must be at least 1");
            }
        }
        if let Some(retries) = lookup("LEADERBOARD_MAX_CONFLICT_RETRIES") {
            leaderboard.max_conflict_retries = retries
                .parse()
                .with_context(|| format!("invalid LEADERBOARD_MAX_CONFLICT_RETRIES '{}'", retries))?;
        }
        if let Some(pretty) = lookup("LEADERBOARD_PRETTY_JSON") {
            leaderboard.pretty_json = parse_flag("LEADERBOARD_PRETTY_JSON", &pretty)?;
        }

        let allow_replace = match lookup("LEADERBOARD_ALLOW_REPLACE") {
            Some(value) => parse_flag("LEADERBOARD_ALLOW_REPLACE", &value)?,
            None => false,
        };

        let static_dir = lookup("LEADERBOARD_STATIC_DIR")
            .map(PathBuf::from)
            .or_else(default_static_dir);

        Ok(Self {
            storage,
            db_path,
            static_dir,
            allow_replace,
            leaderboard,
        })
    }
}

/// `dist` next to the executable, falling back to `./dist`
fn default_static_dir() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let dist_dir = exe_path.parent()?.join("dist");
    if dist_dir.exists() {
        Some(dist_dir)
    } else {
        Some(PathBuf::from("dist"))
    }
}

fn parse_flag(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{} must be a boolean, got '{}'", name, value)),
    }
}
