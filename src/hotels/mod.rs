//! Hotel enrichment for trip details
//!
//! Trip descriptions often name the hotel used for the overnight stay. Names
//! are pulled out with a regex and, when a Google Maps key is configured,
//! looked up through the Places API. Lookups never fail: anything that goes
//! wrong degrades to a plain web-search link.

use crate::constants::api::{
    GOOGLE_PLACES_DETAILS_URL, GOOGLE_PLACES_SEARCH_URL, GOOGLE_SEARCH_URL, LOOKUP_TIMEOUT_SECS,
};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const HOTEL_PATTERN: &str = r"([A-Z][\w\s,&-]{1,60}Hotel|Hotel\s+[A-Z][\w\s,&-]{1,60})";

/// Photos and reviews kept from place details
const MAX_DETAIL_ITEMS: usize = 3;

/// What we know about a hotel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<PhotoRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<serde_json::Value>,
    /// Web search link, set when no place data is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct PlacesSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: Option<String>,
    formatted_address: Option<String>,
    vicinity: Option<String>,
    place_id: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    website: Option<String>,
    #[serde(default)]
    photos: Vec<PhotoRef>,
    #[serde(default)]
    reviews: Vec<serde_json::Value>,
}

/// Extracts hotel names and looks them up
#[derive(Debug, Clone)]
pub struct HotelService {
    client: reqwest::Client,
    api_key: Option<String>,
    pattern: Regex,
}

impl HotelService {
    /// Create a service; an empty key disables Places lookups
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(LOOKUP_TIMEOUT_SECS))
    }

    /// Create a service whose Places requests give up after `timeout`
    pub fn with_timeout(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let pattern = Regex::new(HOTEL_PATTERN)
            .map_err(|e| Error::Config(format!("Invalid hotel pattern: {}", e)))?;

        Ok(Self {
            client,
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
            pattern,
        })
    }

    /// Hotel names mentioned in free text, de-duplicated in order of appearance
    pub fn extract_hotel_names(&self, text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for m in self.pattern.find_iter(text) {
            let name = m.as_str().trim().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Look a hotel up, falling back to a search link
    pub async fn lookup_hotel(&self, name: &str) -> HotelInfo {
        if let Some(key) = &self.api_key {
            match self.lookup_place(name, key).await {
                Ok(Some(info)) => return info,
                Ok(None) => debug!("No Places match for '{}'", name),
                Err(e) => debug!("Places lookup for '{}' failed: {}", name, e),
            }
        }
        search_link(name)
    }

    /// Look up every hotel named in `text`
    pub async fn hotels_in(&self, text: &str) -> Vec<HotelInfo> {
        let mut hotels = Vec::new();
        for name in self.extract_hotel_names(text) {
            hotels.push(self.lookup_hotel(&name).await);
        }
        hotels
    }

    async fn lookup_place(&self, name: &str, key: &str) -> Result<Option<HotelInfo>> {
        let search: PlacesSearchResponse = self
            .client
            .get(GOOGLE_PLACES_SEARCH_URL)
            .query(&[("query", name), ("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if search.status != "OK" {
            debug!("Places search for '{}' returned {}", name, search.status);
        }

        let Some(place) = search.results.into_iter().next() else {
            return Ok(None);
        };
        let mut info = place_info(place);

        // Details are optional extras; a failure here still returns the search hit
        if let Some(place_id) = info.place_id.clone() {
            match self.place_details(&place_id, key).await {
                Ok(Some(details)) => apply_details(&mut info, details),
                Ok(None) => {}
                Err(e) => debug!("Place details for {} failed: {}", place_id, e),
            }
        }

        Ok(Some(info))
    }

    async fn place_details(&self, place_id: &str, key: &str) -> Result<Option<PlaceDetails>> {
        let response: PlaceDetailsResponse = self
            .client
            .get(GOOGLE_PLACES_DETAILS_URL)
            .query(&[("place_id", place_id), ("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.result)
    }
}

fn place_info(place: PlaceResult) -> HotelInfo {
    HotelInfo {
        name: place.name.unwrap_or_default(),
        address: place.formatted_address.or(place.vicinity),
        place_id: place.place_id,
        rating: place.rating,
        user_ratings_total: place.user_ratings_total,
        ..HotelInfo::default()
    }
}

fn apply_details(info: &mut HotelInfo, details: PlaceDetails) {
    info.website = details.website;
    info.photos = details.photos.into_iter().take(MAX_DETAIL_ITEMS).collect();
    info.reviews = details.reviews.into_iter().take(MAX_DETAIL_ITEMS).collect();
}

fn search_link(name: &str) -> HotelInfo {
    HotelInfo {
        name: name.to_string(),
        search: Some(format!("{}?q={}", GOOGLE_SEARCH_URL, urlencoding::encode(name))),
        ..HotelInfo::default()
    }
}
