use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::insights::pipeline::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_ATTEMPTS};
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Only numeric values can fail; a missing API key disables generation.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout: Duration,
    pub max_attempts: u32,
    pub insights_log_path: PathBuf,
    pub static_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_timeout: Duration::from_secs(parse_positive_env(
                "LLM_TIMEOUT_SECS",
                DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
            )?),
            max_attempts: parse_positive_env("INSIGHTS_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            insights_log_path: optional_env("INSIGHTS_LOG_PATH")
                .unwrap_or_else(|| "latest_insights.json".to_string())
                .into(),
            static_dir: optional_env("STATIC_DIR").unwrap_or_else(|| ".".to_string()).into(),
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset and blank values both count as absent.
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
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

/// Like `parse_env`, but zero is rejected.
fn parse_positive_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_env(key, default)?;
    if value < T::from(1) {
        bail!("{key} must be at least 1");
    }
    Ok(value)
}
