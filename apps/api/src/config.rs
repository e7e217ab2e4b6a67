use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub serper_api_key: Option<String>,
    /// Scrape snapshots and retrieval documents live here.
    pub data_dir: PathBuf,
    /// Session and feedback JSON documents live here.
    pub store_dir: PathBuf,
    pub session_timeout_minutes: i64,
    pub scrape_timeout_secs: u64,
    /// How many past turns of a session are fed back to the LLM as context.
    pub history_turns: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let data_dir = PathBuf::from(optional_env("DATA_DIR").unwrap_or_else(|| "data".into()));
        let store_dir = optional_env("STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("store"));

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            serper_api_key: optional_env("SERPER_API_KEY"),
            data_dir,
            store_dir,
            session_timeout_minutes: parse_env("SESSION_TIMEOUT_MINUTES", 30)?,
            scrape_timeout_secs: parse_env("SCRAPE_TIMEOUT_SECS", 20)?,
            history_turns: parse_env("HISTORY_TURNS", 3)?,
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
