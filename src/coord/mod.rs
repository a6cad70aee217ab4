//! Coordinates and great-circle distance
//!
//! This module handles:
//! - Validating query locations
//! - Parsing raw (textual, nullable) coordinates fetched from storage
//! - Haversine distance in kilometres

pub mod distance;

use serde::{Deserialize, Serialize};

pub use distance::{haversine_km, round_to};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Parse a raw latitude/longitude pair as stored in the database
    ///
    /// Returns `None` when either side is missing, not a number, or out of range.
    pub fn parse_raw(lat: Option<&str>, lng: Option<&str>) -> Option<Self> {
        let lat: f64 = lat?.trim().parse().ok()?;
        let lng: f64 = lng?.trim().parse().ok()?;
        let coords = Self::new(lat, lng);
        coords.validate().ok().map(|_| coords)
    }
}
