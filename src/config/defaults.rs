//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Default database host
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default database port
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default database user
pub const DEFAULT_DB_USER: &str = "root";

/// Default connection pool size
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Seconds to wait for a pooled connection
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default geocoding provider
pub const DEFAULT_GEOCODER: &str = "nominatim";

/// Default chat completion model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default system prompt for the language model
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful trip assistant specialized in Ashtavinayak tours.";

/// Default site crawled for supplementary answers
pub const DEFAULT_SCRAPE_BASE: &str = "https://www.ashtavinayak.net";

/// Maximum pages visited per crawl
pub const DEFAULT_MAX_PAGES: usize = 20;

/// Per-page fetch timeout in seconds
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 8;

/// Characters kept either side of a search hit
pub const DEFAULT_SNIPPET_RADIUS: usize = 200;

/// Timeout for outbound API calls in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "trip-guide";
