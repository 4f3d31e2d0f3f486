use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::services::FetchSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scorecard: ScorecardSettings,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScorecardSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ScorecardSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String { crate::services::scorecard::DEFAULT_BASE_URL.to_string() }
fn default_per_page() -> u32 { 100 }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_per_partition_cap")]
    pub per_partition_cap: usize,
    #[serde(default = "default_broad_cap")]
    pub broad_cap: usize,
    #[serde(default = "default_partition_max_pages")]
    pub partition_max_pages: u32,
    #[serde(default = "default_broad_max_pages")]
    pub broad_max_pages: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub server_side_filters: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_partition_cap: default_per_partition_cap(),
            broad_cap: default_broad_cap(),
            partition_max_pages: default_partition_max_pages(),
            broad_max_pages: default_broad_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            max_concurrency: default_max_concurrency(),
            server_side_filters: false,
        }
    }
}

impl From<&FetchConfig> for FetchSettings {
    fn from(config: &FetchConfig) -> Self {
        FetchSettings {
            per_partition_cap: config.per_partition_cap,
            broad_cap: config.broad_cap,
            partition_max_pages: config.partition_max_pages,
            broad_max_pages: config.broad_max_pages,
            page_delay: Duration::from_millis(config.page_delay_ms),
            max_concurrency: config.max_concurrency,
            server_side_filters: config.server_side_filters,
        }
    }
}

fn default_per_partition_cap() -> usize { 200 }
fn default_broad_cap() -> usize { 500 }
fn default_partition_max_pages() -> u32 { 50 }
fn default_broad_max_pages() -> u32 { 10 }
fn default_page_delay_ms() -> u64 { 500 }
fn default_max_concurrency() -> usize { 16 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_ttl_secs() -> u64 { 300 }
fn default_capacity() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize { 50 }
fn default_max_limit() -> usize { 200 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with COLLEGE_MATCH)
    /// 4. SCORECARD_API_KEY for the provider key
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., COLLEGE_MATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("COLLEGE_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_api_key_override(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("COLLEGE_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_api_key_override(settings)?.try_deserialize()
    }
}

/// Take the provider key from SCORECARD_API_KEY when set
fn apply_api_key_override(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("SCORECARD_API_KEY") {
        Ok(key) if !key.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("scorecard.api_key", key)?
            .build(),
        _ => Ok(settings),
    }
}
