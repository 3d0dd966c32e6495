use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means tasks live in memory only.
    pub database_url: Option<String>,
    pub workers: usize,
    pub queue_capacity: usize,
    pub max_file_size_mb: u64,
    pub timeout_secs: u64,
    pub user_id: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            workers: parse_env("PARSER_WORKERS", DEFAULT_WORKERS)?,
            queue_capacity: parse_env("PARSER_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
            max_file_size_mb: parse_env("PARSER_MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MB)?,
            timeout_secs: parse_env("PARSER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            user_id: std::env::var("PARSER_USER_ID").unwrap_or_else(|_| "local".to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            workers: self.workers.max(1),
            queue_capacity: self.queue_capacity.max(1),
            max_file_size: self.max_file_size_mb * 1024 * 1024,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Worker pool and admission limits for the task coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub workers: usize,
    pub queue_capacity: usize,
    /// Bytes.
    pub max_file_size: u64,
    pub timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_file_size: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
