use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::language_utils;
use crate::models::LanguageCode;

/// Application configuration module
/// This module handles loading and validating the tool server settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language used by `download_captions` when the caller omits `lang`
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Video platform client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Cache store settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TTL applied when a caller passes 0
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Maximum number of live entries (0 = unbounded)
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,

    /// Interval of the background expiry sweep in seconds (0 = no sweep)
    #[serde(default = "default_check_period_secs")]
    pub check_period_secs: u64,

    /// Use a full SHA-256 fingerprint of the query in search keys
    /// instead of the 16-character base64 prefix
    #[serde(default)]
    pub fingerprint_search_keys: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: default_ttl_secs(),
            max_keys: default_max_keys(),
            check_period_secs: default_check_period_secs(),
            fingerprint_search_keys: false,
        }
    }
}

/// Video platform client settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    /// Data API key
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Data API base URL
    #[serde(default = "default_api_endpoint")]
    pub endpoint: String,

    /// Timed-text base URL
    #[serde(default = "default_timedtext_endpoint")]
    pub timedtext_endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_api_endpoint(),
            timedtext_endpoint: default_timedtext_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_max_keys() -> usize {
    1000
}

fn default_check_period_secs() -> u64 {
    600 // 10 minutes
}

fn default_api_endpoint() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_timedtext_endpoint() -> String {
    "https://www.youtube.com/api/timedtext".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load a configuration file, or fall back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in the binary)
    ///
    /// Recognized keys: `CACHE_ENABLED`, `CACHE_DEFAULT_TTL`, `CACHE_MAX_KEYS`,
    /// `YOUTUBE_API_KEY`. Unparseable values are reported, not ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup("CACHE_ENABLED") {
            self.cache.enabled = enabled.trim() != "false";
        }
        if let Some(ttl) = lookup("CACHE_DEFAULT_TTL") {
            self.cache.default_ttl_secs = ttl.trim().parse()
                .with_context(|| format!("CACHE_DEFAULT_TTL is not a number: {}", ttl))?;
        }
        if let Some(max_keys) = lookup("CACHE_MAX_KEYS") {
            self.cache.max_keys = max_keys.trim().parse()
                .with_context(|| format!("CACHE_MAX_KEYS is not a number: {}", max_keys))?;
        }
        if let Some(api_key) = lookup("YOUTUBE_API_KEY") {
            self.client.api_key = api_key;
        }
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let normalized = language_utils::normalize_language_code(&self.default_language);
        LanguageCode::parse(&normalized)
            .map_err(|_| anyhow!("Invalid default language: {}", self.default_language))?;

        if self.cache.enabled && self.cache.default_ttl_secs == 0 {
            return Err(anyhow!("cache.default_ttl_secs must be greater than 0"));
        }

        if self.client.timeout_secs == 0 {
            return Err(anyhow!("client.timeout_secs must be greater than 0"));
        }

        url::Url::parse(&self.client.endpoint)
            .with_context(|| format!("Invalid client endpoint: {}", self.client.endpoint))?;
        url::Url::parse(&self.client.timedtext_endpoint)
            .with_context(|| format!("Invalid timed-text endpoint: {}", self.client.timedtext_endpoint))?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_language: default_language(),
            cache: CacheConfig::default(),
            client: ClientConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
