//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `TSMARKET_API_URL` - Storefront backend base URL (default: <https://tsmarket0001.onrender.com>)
//! - `TSMARKET_STORAGE_PATH` - Local storage file (default: `.tsmarket/storage.json`)
//! - `TSMARKET_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `TSMARKET_CATALOG_TTL_SECS` - Catalog cache freshness (default: 300)
//! - `TSMARKET_TOPUP_POLL_SECS` - Top-up watcher poll interval (default: 30)
//! - `TSMARKET_TOPUP_WATCH_SECS` - Top-up watcher time cap (default: 600)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Production backend.
pub const DEFAULT_API_URL: &str = "https://tsmarket0001.onrender.com";

const DEFAULT_STORAGE_PATH: &str = ".tsmarket/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; API routes live under `<base>/api`
    pub api_url: Url,
    /// Path of the local key/value storage file
    pub storage_path: PathBuf,
    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
    /// Freshness window of the catalog cache
    pub catalog_ttl: Duration,
    /// Interval between top-up status polls
    pub topup_poll_interval: Duration,
    /// Time cap of the top-up watcher
    pub topup_watch_duration: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_api_url(
            "TSMARKET_API_URL",
            &get_env_or_default(&lookup, "TSMARKET_API_URL", DEFAULT_API_URL),
        )?;

        let storage_path = PathBuf::from(get_env_or_default(
            &lookup,
            "TSMARKET_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));

        Ok(Self {
            api_url,
            storage_path,
            request_timeout: get_secs(&lookup, "TSMARKET_REQUEST_TIMEOUT_SECS", 30)?,
            catalog_ttl: get_secs(&lookup, "TSMARKET_CATALOG_TTL_SECS", 300)?,
            topup_poll_interval: get_secs(&lookup, "TSMARKET_TOPUP_POLL_SECS", 30)?,
            topup_watch_duration: get_secs(&lookup, "TSMARKET_TOPUP_WATCH_SECS", 600)?,
        })
    }

    /// Same configuration pointing at another backend.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url("api_url", url)?;
        Ok(self)
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Get a positive number of seconds as a duration.
fn get_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = u64::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute URL".to_string(),
        ));
    }
    // A trailing slash lets `Url::join` treat the path as a directory.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
