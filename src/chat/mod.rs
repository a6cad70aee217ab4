//! Chat orchestration
//!
//! Answers a free-text question by trying, in order:
//! 1. Nearest pickup point, when the question asks about pickups
//! 2. Trip search in the database (with hotel details attached)
//! 3. Website search
//! 4. The language model, grounded in the trip catalog
//!
//! The first source that produces something wins.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{self, GeoBackend};
use crate::hotels::{HotelInfo, HotelService};
use crate::llm::{grounded_prompt, LlmBackend};
use crate::resolver::{resolve_nearest, NearestPoint, Resolution};
use crate::site::{SearchHit, SiteScraper};
use crate::store::{Trip, TripStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Phrases that route a question to the nearest-pickup search
const PICKUP_KEYWORDS: &[&str] = &["pickup", "pick up", "nearby", "nearest", "pickup point"];

/// Chat request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question
    #[serde(default)]
    pub q: String,
    /// Requester's latitude, if the client shared it
    #[serde(default)]
    pub lat: Option<f64>,
    /// Requester's longitude
    #[serde(default)]
    pub lng: Option<f64>,
    /// Restrict pickup search to one trip
    #[serde(default)]
    pub trip_id: Option<i64>,
    /// Preferred answer language
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "en".to_string()
}

/// A trip with the hotels its description mentions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripWithHotels {
    #[serde(flatten)]
    pub trip: Trip,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hotels: Vec<HotelInfo>,
}

/// Chat answer, tagged by where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatReply {
    PickupNearest { nearest: NearestPoint },
    TripsFound { trips: Vec<TripWithHotels> },
    Scraped { results: Vec<SearchHit> },
    #[serde(rename = "openai")]
    Llm { answer: String },
}

/// Whether a question is asking for a pickup point
pub fn is_pickup_query(q: &str) -> bool {
    let q = q.to_lowercase();
    PICKUP_KEYWORDS.iter().any(|k| q.contains(k))
}

/// Answers chat questions from the configured sources
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn TripStore>,
    geocoder: Arc<dyn GeoBackend>,
    hotels: HotelService,
    scraper: Option<SiteScraper>,
    llm: Option<Arc<dyn LlmBackend>>,
    system_prompt: String,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn TripStore>,
        geocoder: Arc<dyn GeoBackend>,
        hotels: HotelService,
        scraper: Option<SiteScraper>,
        llm: Option<Arc<dyn LlmBackend>>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            store,
            geocoder,
            hotels,
            scraper,
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    /// Answer one chat request
    pub async fn answer(&self, req: &ChatRequest) -> Result<ChatReply> {
        let q = req.q.trim();
        if q.is_empty() {
            return Err(Error::InvalidRequest("empty query".to_string()));
        }

        if is_pickup_query(q) {
            return self.nearest_pickup(q, req).await;
        }

        if let Some(reply) = self.trips(q).await? {
            return Ok(reply);
        }

        if let Some(reply) = self.scraped(q).await {
            return Ok(reply);
        }

        if let Some(reply) = self.ask_llm(q, &req.lang).await? {
            return Ok(reply);
        }

        Err(Error::NotFound("no information found for query".to_string()))
    }

    /// Location from the request body, else from geocoding the question
    async fn query_location(&self, q: &str, req: &ChatRequest) -> Result<Option<Coordinates>> {
        if let (Some(lat), Some(lng)) = (req.lat, req.lng) {
            let coords = Coordinates::new(lat, lng);
            coords.validate()?;
            return Ok(Some(coords));
        }
        Ok(geo::locate(self.geocoder.as_ref(), q).await)
    }

    async fn nearest_pickup(&self, q: &str, req: &ChatRequest) -> Result<ChatReply> {
        let location = self.query_location(q, req).await?.ok_or_else(|| {
            Error::InvalidRequest(
                "latitude & longitude required for pickup nearest query".to_string(),
            )
        })?;

        let points = self.store.fetch_points(req.trip_id).await?;
        match resolve_nearest(location, &points, req.trip_id) {
            Resolution::Found(nearest) => {
                info!(
                    "Nearest pickup to ({}, {}) is '{}' at {} km",
                    location.lat, location.lng, nearest.point.name, nearest.distance_km
                );
                Ok(ChatReply::PickupNearest { nearest })
            }
            Resolution::NotFound => Err(Error::NotFound("no pickup points found".to_string())),
        }
    }

    async fn trips(&self, q: &str) -> Result<Option<ChatReply>> {
        let found = self.store.search_trips(q).await?;
        if found.is_empty() {
            return Ok(None);
        }

        let mut trips = Vec::with_capacity(found.len());
        for trip in found {
            let hotels = match trip.details.as_deref() {
                Some(details) => self.hotels.hotels_in(details).await,
                None => Vec::new(),
            };
            trips.push(TripWithHotels { trip, hotels });
        }

        debug!("Chat matched {} trips", trips.len());
        Ok(Some(ChatReply::TripsFound { trips }))
    }

    async fn scraped(&self, q: &str) -> Option<ChatReply> {
        let scraper = self.scraper.as_ref()?;
        let results = scraper.search(q).await;
        (!results.is_empty()).then_some(ChatReply::Scraped { results })
    }

    async fn ask_llm(&self, q: &str, lang: &str) -> Result<Option<ChatReply>> {
        let Some(llm) = &self.llm else {
            return Ok(None);
        };

        let catalog = self.store.list_trips().await.unwrap_or_else(|e| {
            warn!("Could not load trip catalog for the model prompt: {}", e);
            Vec::new()
        });

        let mut system = grounded_prompt(&self.system_prompt, &catalog);
        if !lang.is_empty() && lang != "en" {
            system.push_str(&format!("\nReply in the language with code '{}'.", lang));
        }

        let answer = llm.complete(&system, q).await?;
        Ok(Some(ChatReply::Llm { answer }))
    }
}
