//! Client Configuration
//!
//! Resolved once at process start.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;

pub const BACKEND_URL_VAR: &str = "PACKLIST_BACKEND_URL";
pub const LOG_DIR_VAR: &str = "PACKLIST_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "PACKLIST_LOG_LEVEL";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Scheme + host (+ optional path) of the remote store, no trailing slash
    pub backend_url: String,
    pub api_prefix: String,
    /// Rolling log files go here; `None` logs to stderr
    pub log_dir: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    pub fn new(backend_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: parse_backend_url(&backend_url.into())?,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            log_dir: None,
            log_level: Level::INFO,
        })
    }

    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; unset or blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(get(BACKEND_URL_VAR).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()))?;
        config.log_dir = get(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(level) = get(LOG_LEVEL_VAR) {
            config.log_level =
                Level::from_str(level.trim()).map_err(|_| ConfigError::InvalidLogLevel(level.clone()))?;
        }
        Ok(config)
    }

    /// Base every endpoint path is appended to
    pub fn api_base(&self) -> String {
        format!("{}{}", self.backend_url, self.api_prefix)
    }
}

fn parse_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}
