//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/trip-guide/config.toml
//!
//! Environment variables (optionally from a `.env` file) override file values
//! after loading, so deployments can be configured without a config file.

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Geocoding settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Language model fallback
    #[serde(default)]
    pub llm: LlmConfig,

    /// Website scraping fallback
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; overrides the individual fields when set
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Database (schema) name
    #[serde(default)]
    pub name: String,

    /// Maximum pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Seconds to wait for a connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// "nominatim" or "google"
    #[serde(default = "default_geocoder")]
    pub provider: String,
}

/// Language model fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Use the language model when nothing else answers
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Chat completion model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// System prompt; the trip catalog is appended to it
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

/// Website scraping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Crawl start page; only links under it are followed
    #[serde(default = "default_scrape_base")]
    pub base_url: String,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,

    /// Characters kept either side of a match
    #[serde(default = "default_snippet_radius")]
    pub snippet_radius: usize,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// Google Maps (geocoding and places)
    #[serde(default)]
    pub google_maps: String,

    /// OpenAI chat completions
    #[serde(default)]
    pub openai: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_db_host() -> String {
    DEFAULT_DB_HOST.to_string()
}
fn default_db_port() -> u16 {
    DEFAULT_DB_PORT
}
fn default_db_user() -> String {
    DEFAULT_DB_USER.to_string()
}
fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}
fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}
fn default_geocoder() -> String {
    DEFAULT_GEOCODER.to_string()
}
fn default_true() -> bool {
    true
}
fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_scrape_base() -> String {
    DEFAULT_SCRAPE_BASE.to_string()
}
fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}
fn default_scrape_timeout() -> u64 {
    DEFAULT_SCRAPE_TIMEOUT_SECS
}
fn default_snippet_radius() -> usize {
    DEFAULT_SNIPPET_RADIUS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            name: String::new(),
            pool_size: default_pool_size(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: default_geocoder(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_llm_model(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_scrape_base(),
            max_pages: default_max_pages(),
            timeout_secs: default_scrape_timeout(),
            snippet_radius: default_snippet_radius(),
        }
    }
}

/// Environment variables and the config keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("GOOGLE_MAPS_API_KEY", "api_keys.google_maps"),
    ("OPENAI_API_KEY", "api_keys.openai"),
    ("ASHTA_BASE", "scraper.base_url"),
    ("PORT", "server.port"),
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load the config file, then apply environment overrides
    ///
    /// An unreadable config file falls back to defaults with a warning.
    pub fn load_effective() -> Result<Self> {
        let mut config = Self::load().unwrap_or_else(|e| {
            warn!("{}; using defaults", e);
            Config::default()
        });
        config.apply_env()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty variables are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                self.set(key, &value).map_err(|e| match e {
                    Error::Config(msg) => Error::Config(format!("{} (from ${})", msg, var)),
                    other => other,
                })?;
            }
        }
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "cors_origins"] => Some(self.server.cors_origins.join(",")),

            ["database", "url"] => Some(self.database.url.clone()),
            ["database", "host"] => Some(self.database.host.clone()),
            ["database", "port"] => Some(self.database.port.to_string()),
            ["database", "user"] => Some(self.database.user.clone()),
            ["database", "password"] => Some(self.database.password.clone()),
            ["database", "name"] => Some(self.database.name.clone()),
            ["database", "pool_size"] => Some(self.database.pool_size.to_string()),
            ["database", "connect_timeout_secs"] => {
                Some(self.database.connect_timeout_secs.to_string())
            }

            ["geocoding", "provider"] => Some(self.geocoding.provider.clone()),

            ["llm", "enabled"] => Some(self.llm.enabled.to_string()),
            ["llm", "model"] => Some(self.llm.model.clone()),
            ["llm", "system_prompt"] => Some(self.llm.system_prompt.clone()),
            ["llm", "timeout_secs"] => Some(self.llm.timeout_secs.to_string()),

            ["scraper", "enabled"] => Some(self.scraper.enabled.to_string()),
            ["scraper", "base_url"] => Some(self.scraper.base_url.clone()),
            ["scraper", "max_pages"] => Some(self.scraper.max_pages.to_string()),
            ["scraper", "timeout_secs"] => Some(self.scraper.timeout_secs.to_string()),
            ["scraper", "snippet_radius"] => Some(self.scraper.snippet_radius.to_string()),

            ["api_keys", "google_maps"] => Some(self.api_keys.google_maps.clone()),
            ["api_keys", "openai"] => Some(self.api_keys.openai.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse_value(key, value)?,
            ["server", "cors_origins"] => {
                self.server.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }

            ["database", "url"] => self.database.url = value.to_string(),
            ["database", "host"] => self.database.host = value.to_string(),
            ["database", "port"] => self.database.port = parse_value(key, value)?,
            ["database", "user"] => self.database.user = value.to_string(),
            ["database", "password"] => self.database.password = value.to_string(),
            ["database", "name"] => self.database.name = value.to_string(),
            ["database", "pool_size"] => self.database.pool_size = parse_value(key, value)?,
            ["database", "connect_timeout_secs"] => {
                self.database.connect_timeout_secs = parse_value(key, value)?
            }

            ["geocoding", "provider"] => match value {
                "nominatim" | "google" => self.geocoding.provider = value.to_string(),
                _ => {
                    return Err(Error::Config(format!(
                        "Unknown geocoding provider: {} (expected nominatim or google)",
                        value
                    )))
                }
            },

            ["llm", "enabled"] => self.llm.enabled = parse_value(key, value)?,
            ["llm", "model"] => self.llm.model = value.to_string(),
            ["llm", "system_prompt"] => self.llm.system_prompt = value.to_string(),
            ["llm", "timeout_secs"] => self.llm.timeout_secs = parse_value(key, value)?,

            ["scraper", "enabled"] => self.scraper.enabled = parse_value(key, value)?,
            ["scraper", "base_url"] => self.scraper.base_url = value.to_string(),
            ["scraper", "max_pages"] => self.scraper.max_pages = parse_value(key, value)?,
            ["scraper", "timeout_secs"] => self.scraper.timeout_secs = parse_value(key, value)?,
            ["scraper", "snippet_radius"] => {
                self.scraper.snippet_radius = parse_value(key, value)?
            }

            ["api_keys", "google_maps"] => self.api_keys.google_maps = value.to_string(),
            ["api_keys", "openai"] => self.api_keys.openai = value.to_string(),

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "server.cors_origins",
            "database.url",
            "database.host",
            "database.port",
            "database.user",
            "database.password",
            "database.name",
            "database.pool_size",
            "database.connect_timeout_secs",
            "geocoding.provider",
            "llm.enabled",
            "llm.model",
            "llm.system_prompt",
            "llm.timeout_secs",
            "scraper.enabled",
            "scraper.base_url",
            "scraper.max_pages",
            "scraper.timeout_secs",
            "scraper.snippet_radius",
            "api_keys.google_maps",
            "api_keys.openai",
        ]
    }

    /// Whether a key holds a secret that should not be printed
    pub fn is_secret(key: &str) -> bool {
        matches!(
            key,
            "database.password" | "database.url" | "api_keys.google_maps" | "api_keys.openai"
        )
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
