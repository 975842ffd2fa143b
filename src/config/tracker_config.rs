//! SchoolTracker configuration file handling
//!
//! Loads and manages the ~/.config/schooltracker/config.yaml file.

use crate::cache::CachePolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_token_env() -> String {
    "SCHOOLTRACKER_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the bearer token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Cache locations and lifetimes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory for persisted aggregate caches
    #[serde(default = "default_cache_dir")]
    pub directory: PathBuf,

    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,

    #[serde(default = "default_countries_ttl")]
    pub countries_ttl_secs: u64,

    #[serde(default = "default_institutions_ttl")]
    pub institutions_ttl_secs: u64,
}

fn default_cache_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".cache");
    path.push("schooltracker");
    path
}

fn default_detail_ttl() -> u64 {
    5 * 60
}

fn default_countries_ttl() -> u64 {
    24 * 60 * 60
}

fn default_institutions_ttl() -> u64 {
    30 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_dir(),
            detail_ttl_secs: default_detail_ttl(),
            countries_ttl_secs: default_countries_ttl(),
            institutions_ttl_secs: default_institutions_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            detail_ttl: secs(self.detail_ttl_secs),
            countries_ttl: secs(self.countries_ttl_secs),
            institutions_ttl: secs(self.institutions_ttl_secs),
        }
    }
}

/// TTL for a configured number of seconds, `None` past the representable range
pub(crate) fn ttl_from_secs(value: u64) -> Option<chrono::Duration> {
    i64::try_from(value)
        .ok()
        .and_then(chrono::Duration::try_seconds)
}

fn secs(value: u64) -> chrono::Duration {
    ttl_from_secs(value).unwrap_or(chrono::Duration::MAX)
}

/// Search behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum results per category
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,

    /// Page size used to pull the directory snapshot
    #[serde(default = "default_snapshot_page_size")]
    pub snapshot_page_size: u32,

    /// How often the background task checks the snapshot, in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_result_cap() -> usize {
    crate::search::CATEGORY_CAP
}

fn default_snapshot_page_size() -> u32 {
    crate::directory::DEFAULT_SNAPSHOT_PAGE_SIZE
}

fn default_refresh_interval() -> u64 {
    30 * 60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_cap: default_result_cap(),
            snapshot_page_size: default_snapshot_page_size(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl SearchConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// SchoolTracker configuration
///
/// Every section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default path (~/.config/schooltracker/config.yaml)
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::TrackerError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading SchoolTracker configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            base_url = %config.api.base_url,
            cache_dir = %config.cache.directory.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving SchoolTracker configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Check the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_config_result(self)
    }

    /// Get the default config path (~/.config/schooltracker/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("schooltracker");
        path.push("config.yaml");
        path
    }
}
