//! Google Geocoding API backend
//!
//! Requires an API key (`api_keys.google_maps` or `GOOGLE_MAPS_API_KEY`).

use crate::constants::api::{GOOGLE_GEOCODE_URL, LOOKUP_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoLocation};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Google geocoding backend
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Pick the first result out of a decoded response
    fn first_location(response: GeocodeResponse) -> Result<Option<GeoLocation>> {
        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().next().map(|r| GeoLocation {
                lat: r.geometry.location.lat,
                lng: r.geometry.location.lng,
                display_name: r.formatted_address,
            })),
            "ZERO_RESULTS" => Ok(None),
            status => Err(Error::Geocoding(format!(
                "Google geocoding returned {}: {}",
                status,
                response.error_message.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait]
impl GeoBackend for GoogleGeocoder {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let response = self
            .client
            .get(GOOGLE_GEOCODE_URL)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Google geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Google geocoding returned status: {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse geocoding response: {}", e)))?;

        Self::first_location(body)
    }
}
