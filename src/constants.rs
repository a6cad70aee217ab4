//! Centralized constants for the trip-guide crate
//!
//! Values shared by several modules live here so they stay in one place.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometres used by the haversine formula
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Decimal places kept on reported distances
    pub const DISTANCE_PRECISION: u32 = 3;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Google Geocoding API
    pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

    /// Google Places text search
    pub const GOOGLE_PLACES_SEARCH_URL: &str =
        "https://maps.googleapis.com/maps/api/place/textsearch/json";

    /// Google Places details
    pub const GOOGLE_PLACES_DETAILS_URL: &str =
        "https://maps.googleapis.com/maps/api/place/details/json";

    /// Plain web search, used when a hotel cannot be looked up
    pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

    /// Timeout for geocoding and Places lookups, in seconds
    pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

    /// OpenAI chat completions endpoint
    pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
}

/// User agent sent on every outbound request
pub const USER_AGENT: &str = concat!("trip-guide/", env!("CARGO_PKG_VERSION"));
