//! HTTP API routes
//!
//! Defines all REST API endpoints for the server. Successful bodies carry
//! `"ok": true`; failures are `{"ok": false, "error": ..., "code": ...}`.

use crate::chat::{ChatReply, ChatRequest};
use crate::coord::Coordinates;
use crate::error::Error;
use crate::geo;
use crate::resolver::{resolve_nearest, NearestPoint, Resolution};
use crate::server::state::AppState;
use crate::store::Trip;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/trips", get(trips_handler))
        .route("/trip/:name", get(trip_handler))
        .route("/pickups", get(pickups_handler))
        .route("/chat", post(chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins; any origin when none are listed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub ok: bool,
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidCoordinates(msg) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_COORDINATES", msg)
            }
            Error::InvalidRequest(msg) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg)
            }
            Error::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Error::Database(e) => {
                error!("Database error: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "database query failed",
                )
            }
            e @ (Error::Geocoding(_) | Error::Llm(_) | Error::Http(_)) => {
                error!("Upstream error: {}", e);
                ApiError::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
            }
            e => {
                error!("Internal error: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    e.to_string(),
                )
            }
        }
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Server version
    pub version: String,
    /// Storage backend name
    pub store: String,
    /// Whether the store answered a ping
    pub database: bool,
    pub geocoder: String,
    /// Language model backend, if configured
    pub llm: Option<String>,
    pub started_at: String,
    pub uptime_secs: u64,
}

/// Server health endpoint
///
/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: {} store unreachable: {}", state.store.name(), e);
            false
        }
    };

    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store.name().to_string(),
        database,
        geocoder: state.geocoder.name().to_string(),
        llm: state.llm_name().map(String::from),
        started_at: state.started_at().to_rfc3339(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Trips list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TripsResponse {
    pub ok: bool,
    pub trips: Vec<Trip>,
}

/// List all trips (for the dropdown)
///
/// GET /trips
async fn trips_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TripsResponse>, ApiError> {
    let trips = state.store.list_trips().await?;
    Ok(Json(TripsResponse { ok: true, trips }))
}

/// Single trip response
#[derive(Debug, Serialize, Deserialize)]
pub struct TripResponse {
    pub ok: bool,
    pub trip: Trip,
}

/// Trip details by name
///
/// GET /trip/:name
async fn trip_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TripResponse>, ApiError> {
    let trip = state
        .store
        .find_trip(&name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Trip '{}' not found", name)))?;

    Ok(Json(TripResponse { ok: true, trip }))
}

/// Nearest pickup query parameters
///
/// Values are taken as text so malformed numbers count as missing.
#[derive(Debug, Default, Deserialize)]
pub struct PickupQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub trip_id: Option<String>,
    /// Free-text place to geocode when lat/lng are absent
    pub place: Option<String>,
}

fn parse_param<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// Nearest pickup response
#[derive(Debug, Serialize, Deserialize)]
pub struct NearestResponse {
    pub ok: bool,
    pub nearest: NearestPoint,
}

/// Nearest pickup point to a location
///
/// GET /pickups?lat=..&lng=..[&trip_id=..] or /pickups?place=..
async fn pickups_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PickupQuery>,
) -> Result<Json<NearestResponse>, ApiError> {
    let trip_id: Option<i64> = parse_param(&params.trip_id);

    let location = match (parse_param::<f64>(&params.lat), parse_param::<f64>(&params.lng)) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => match params.place.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(place) => geo::locate(state.geocoder.as_ref(), place).await,
            None => None,
        },
    };

    let location = location.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "MISSING_LOCATION",
            "lat and lng parameters are required",
        )
    })?;
    location.validate()?;

    let points = state.store.fetch_points(trip_id).await?;

    match resolve_nearest(location, &points, trip_id) {
        Resolution::Found(nearest) => {
            info!(
                "Nearest pickup to ({}, {}) is '{}' at {} km",
                location.lat, location.lng, nearest.point.name, nearest.distance_km
            );
            Ok(Json(NearestResponse { ok: true, nearest }))
        }
        Resolution::NotFound => {
            Err(Error::NotFound("no pickup points found".to_string()).into())
        }
    }
}

/// Chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub reply: ChatReply,
}

/// Main chat endpoint
///
/// POST /chat
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = state.chat.answer(&req).await?;
    Ok(Json(ChatResponse { ok: true, reply }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Result;
    use crate::geo::{GeoBackend, GeoLocation};
    use crate::llm::LlmBackend;
    use crate::resolver::CandidatePoint;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Geocoder that knows one place
    struct OnePlace;

    #[async_trait]
    impl GeoBackend for OnePlace {
        fn name(&self) -> &'static str {
            "one-place"
        }

        async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
            Ok((query.to_lowercase() == "pune").then(|| GeoLocation {
                lat: 18.5204,
                lng: 73.8567,
                display_name: "Pune, Maharashtra, India".to_string(),
            }))
        }
    }

    struct CannedLlm;

    #[async_trait]
    impl LlmBackend for CannedLlm {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn complete(&self, _system: &str, _question: &str) -> Result<String> {
            Ok("Siddhivinayak at Siddhatek is on the Bhima river.".to_string())
        }
    }

    fn trip(name: &str) -> Trip {
        Trip {
            trip_name: name.to_string(),
            cost: Some("4500".to_string()),
            duration: Some("2 days".to_string()),
            details: Some("All eight temples. Stay: Hotel Shivneri Residency.".to_string()),
            trip_date: Some("2026-11-14".to_string()),
            contact: Some("9820000000".to_string()),
        }
    }

    fn create_test_state(llm: Option<Arc<dyn LlmBackend>>) -> Arc<AppState> {
        let mut unparsable = CandidatePoint::new("Unknown stop", 0.0, 0.0).in_group(1);
        unparsable.lat = Some("not-a-number".to_string());

        let store = MemoryStore::new(
            vec![trip("Ashtavinayak Yatra"), trip("Konkan Ganpati Darshan")],
            vec![
                unparsable,
                CandidatePoint::new("Thane", 19.2183, 72.9781).in_group(1),
                CandidatePoint::new("Swargate", 18.5018, 73.8636).in_group(2),
            ],
        );

        let mut config = Config::default();
        config.scraper.enabled = false;

        Arc::new(
            AppState::with_services(config, Arc::new(store), Arc::new(OnePlace), llm).unwrap(),
        )
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = create_router(create_test_state(None));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_chat(
        state: Arc<AppState>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let app = create_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: HealthResponse = serde_json::from_value(body).unwrap();
        assert!(health.ok);
        assert!(health.database);
        assert_eq!(health.store, "memory");
        assert_eq!(health.geocoder, "one-place");
        assert!(health.llm.is_none());
    }

    #[tokio::test]
    async fn test_trips_endpoint() {
        let (status, body) = get_json("/trips").await;
        assert_eq!(status, StatusCode::OK);

        let trips: TripsResponse = serde_json::from_value(body).unwrap();
        assert!(trips.ok);
        assert_eq!(trips.trips.len(), 2);
        assert_eq!(trips.trips[0].trip_date.as_deref(), Some("2026-11-14"));
    }

    #[tokio::test]
    async fn test_trip_endpoint() {
        let (status, body) = get_json("/trip/Konkan%20Ganpati%20Darshan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["trip"]["trip_name"], "Konkan Ganpati Darshan");
    }

    #[tokio::test]
    async fn test_trip_not_found() {
        let (status, body) = get_json("/trip/Goa").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Trip 'Goa' not found");
    }

    #[tokio::test]
    async fn test_pickups_nearest() {
        let (status, body) = get_json("/pickups?lat=19.0760&lng=72.8777").await;
        assert_eq!(status, StatusCode::OK);

        let res: NearestResponse = serde_json::from_value(body).unwrap();
        assert_eq!(res.nearest.point.name, "Thane");
        assert_eq!(res.nearest.distance_km, 19.016);
    }

    #[tokio::test]
    async fn test_pickups_filtered_by_trip() {
        let (status, body) = get_json("/pickups?lat=19.0760&lng=72.8777&trip_id=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nearest"]["pickuppoint"], "Swargate");
        assert_eq!(body["nearest"]["trip_id"], 2);
    }

    #[tokio::test]
    async fn test_pickups_unknown_trip() {
        let (status, body) = get_json("/pickups?lat=19.0760&lng=72.8777&trip_id=9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no pickup points found");
    }

    #[tokio::test]
    async fn test_pickups_by_place() {
        let (status, body) = get_json("/pickups?place=Pune").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nearest"]["pickuppoint"], "Swargate");
    }

    #[tokio::test]
    async fn test_pickups_missing_location() {
        let uris = [
            "/pickups",
            "/pickups?lat=19.07",
            "/pickups?lat=abc&lng=72.8",
            "/pickups?place=Atlantis",
        ];
        for uri in uris {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "lat and lng parameters are required");
            assert_eq!(body["code"], "MISSING_LOCATION");
        }
    }

    #[tokio::test]
    async fn test_pickups_out_of_range() {
        let (status, body) = get_json("/pickups?lat=91&lng=72.8").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_chat_pickup() {
        let (status, body) = post_chat(
            create_test_state(None),
            serde_json::json!({"q": "nearest pickup point?", "lat": 18.53, "lng": 73.85}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["type"], "pickup_nearest");
        assert_eq!(body["nearest"]["pickuppoint"], "Swargate");
    }

    #[tokio::test]
    async fn test_chat_trips_found() {
        let (status, body) =
            post_chat(create_test_state(None), serde_json::json!({"q": "konkan darshan"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "trips_found");
        assert_eq!(body["trips"].as_array().unwrap().len(), 1);
        assert_eq!(body["trips"][0]["hotels"][0]["name"], "Hotel Shivneri Residency");
    }

    #[tokio::test]
    async fn test_chat_llm_fallback() {
        let (status, body) = post_chat(
            create_test_state(Some(Arc::new(CannedLlm))),
            serde_json::json!({"q": "Which temple is on the Bhima river?"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "openai");
        assert!(body["answer"].as_str().unwrap().contains("Siddhatek"));
    }

    #[tokio::test]
    async fn test_chat_empty_query() {
        let (status, body) = post_chat(create_test_state(None), serde_json::json!({"q": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "empty query");
    }

    #[tokio::test]
    async fn test_chat_nothing_found() {
        let (status, body) = post_chat(
            create_test_state(None),
            serde_json::json!({"q": "Which temple is on the Bhima river?"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = ApiError::from(Error::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error, "database query failed");
    }

    #[test]
    fn test_cors_layer_skips_invalid_origin() {
        // Builds without panicking even with a bad entry
        let _ = cors_layer(&["https://trips.example".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&[]);
    }
}
