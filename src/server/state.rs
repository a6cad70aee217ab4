//! Server shared state
//!
//! Every client (database pool, HTTP clients) is built once at start-up and
//! shared read-only between requests.

use crate::chat::ChatService;
use crate::config::Config;
use crate::error::Result;
use crate::geo::{get_geocoder, GeoBackend};
use crate::hotels::HotelService;
use crate::llm::{self, LlmBackend};
use crate::site::SiteScraper;
use crate::store::mysql::MySqlStore;
use crate::store::TripStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Trip and pickup point storage
    pub store: Arc<dyn TripStore>,

    /// Place name lookup
    pub geocoder: Arc<dyn GeoBackend>,

    /// Chat orchestration
    pub chat: ChatService,

    llm_name: Option<&'static str>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state from config, connecting to MySQL lazily
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn TripStore> = Arc::new(MySqlStore::connect_lazy(&config.database)?);
        let geocoder = get_geocoder(&config)?;
        let llm = llm::get_backend(&config)?;
        Self::with_services(config, store, geocoder, llm)
    }

    /// Build state around explicit storage, geocoding and model backends
    pub fn with_services(
        config: Config,
        store: Arc<dyn TripStore>,
        geocoder: Arc<dyn GeoBackend>,
        llm: Option<Arc<dyn LlmBackend>>,
    ) -> Result<Self> {
        let hotels = HotelService::new(&config.api_keys.google_maps)?;
        let scraper = if config.scraper.enabled {
            Some(SiteScraper::new(&config.scraper)?)
        } else {
            None
        };
        let llm_name = llm.as_ref().map(|l| l.name());

        let chat = ChatService::new(
            store.clone(),
            geocoder.clone(),
            hotels,
            scraper,
            llm,
            config.llm.system_prompt.clone(),
        );

        Ok(Self {
            config,
            store,
            geocoder,
            chat,
            llm_name,
            started_at: Utc::now(),
        })
    }

    /// Name of the language model backend, if one is configured
    pub fn llm_name(&self) -> Option<&'static str> {
        self.llm_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
