//! Geocoding module
//!
//! Turns free-text place names into coordinates.

pub mod google;
pub mod nominatim;

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Trait for geocoding backends
#[async_trait]
pub trait GeoBackend: Send + Sync {
    /// Backend name (e.g. "nominatim")
    fn name(&self) -> &'static str;

    /// Geocode a location string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>>;
}

/// Get the geocoding backend selected in config
///
/// Google needs an API key; without one Nominatim is used instead.
pub fn get_geocoder(config: &Config) -> Result<Arc<dyn GeoBackend>> {
    let key = config.api_keys.google_maps.as_str();

    match config.geocoding.provider.as_str() {
        "google" if !key.is_empty() => Ok(Arc::new(google::GoogleGeocoder::new(key)?)),
        "google" => {
            warn!("Google geocoding selected but no API key configured, using Nominatim");
            Ok(Arc::new(nominatim::NominatimBackend::new()?))
        }
        _ => Ok(Arc::new(nominatim::NominatimBackend::new()?)),
    }
}

/// Geocode a place, treating lookup failures the same as "not found"
pub async fn locate(geocoder: &dyn GeoBackend, place: &str) -> Option<Coordinates> {
    match geocoder.geocode(place).await {
        Ok(Some(location)) => {
            let coords = location.coordinates();
            if coords.validate().is_err() {
                warn!("{} returned out-of-range coordinates for '{}'", geocoder.name(), place);
                return None;
            }
            info!("Geocoded '{}' to {} ({}, {})", place, location.display_name, coords.lat, coords.lng);
            Some(coords)
        }
        Ok(None) => {
            info!("No geocoding match for '{}'", place);
            None
        }
        Err(e) => {
            warn!("Geocoding '{}' failed: {}", place, e);
            None
        }
    }
}
