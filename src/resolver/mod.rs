//! Nearest pickup point resolution
//!
//! Given a query location and a list of candidate points, finds the candidate
//! with the smallest great-circle distance. Candidates whose stored
//! coordinates are missing or unparsable are skipped rather than failing the
//! whole search. Ties go to the candidate that appears first.
//!
//! The resolver does no I/O: callers fetch candidates from storage and
//! validate (or geocode) the query location beforehand.

use crate::constants::geo::DISTANCE_PRECISION;
use crate::coord::{haversine_km, round_to, Coordinates};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A candidate location (pickup point) as fetched from storage
///
/// Coordinates stay in their raw textual form; they are parsed per search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoint {
    /// Row identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning trip
    #[serde(rename = "trip_id", default)]
    pub group_id: Option<i64>,

    /// Display name
    #[serde(rename = "pickuppoint")]
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(rename = "pickup_lat", default)]
    pub lat: Option<String>,

    #[serde(rename = "pickup_long", default)]
    pub lng: Option<String>,
}

impl CandidatePoint {
    /// Create a candidate with numeric coordinates
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: None,
            group_id: None,
            name: name.into(),
            address: None,
            lat: Some(lat.to_string()),
            lng: Some(lng.to_string()),
        }
    }

    /// Attach the owning group (trip) id
    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Parsed coordinates, if the stored values are usable
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::parse_raw(self.lat.as_deref(), self.lng.as_deref())
    }
}

/// The winning candidate with its distance from the query location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestPoint {
    #[serde(flatten)]
    pub point: CandidatePoint,

    /// Great-circle distance in kilometres, rounded to 3 decimals
    pub distance_km: f64,
}

/// Outcome of a nearest-point search
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(NearestPoint),
    /// No candidate (after filtering) had usable coordinates
    NotFound,
}

impl Resolution {
    /// Convert into an `Option`, dropping the `NotFound` marker
    pub fn into_option(self) -> Option<NearestPoint> {
        match self {
            Self::Found(nearest) => Some(nearest),
            Self::NotFound => None,
        }
    }
}

/// Find the candidate closest to `query`
///
/// # Arguments
/// * `query` - Query location; must already be validated
/// * `candidates` - Candidate points in their storage order
/// * `group` - When set, only candidates with exactly this group id are considered
///
/// # Returns
/// `Resolution::Found` with the nearest candidate, or `Resolution::NotFound`
/// when the (filtered) set is empty or no candidate has usable coordinates.
pub fn resolve_nearest(
    query: Coordinates,
    candidates: &[CandidatePoint],
    group: Option<i64>,
) -> Resolution {
    let mut best: Option<(&CandidatePoint, f64)> = None;

    let in_scope = candidates
        .iter()
        .filter(|c| group.map_or(true, |g| c.group_id == Some(g)));

    for candidate in in_scope {
        let Some(coords) = candidate.coordinates() else {
            debug!(
                "Skipping pickup point '{}' with unusable coordinates ({:?}, {:?})",
                candidate.name, candidate.lat, candidate.lng
            );
            continue;
        };

        let distance = haversine_km(query, coords);

        // Strict comparison keeps the first of equally distant candidates
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }

    match best {
        Some((point, distance)) => Resolution::Found(NearestPoint {
            point: point.clone(),
            distance_km: round_to(distance, DISTANCE_PRECISION),
        }),
        None => Resolution::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mumbai() -> Coordinates {
        Coordinates::new(19.0760, 72.8777)
    }

    fn unparsable(name: &str) -> CandidatePoint {
        CandidatePoint {
            id: None,
            group_id: None,
            name: name.to_string(),
            address: None,
            lat: Some("n/a".to_string()),
            lng: Some("".to_string()),
        }
    }

    #[test]
    fn test_mumbai_scenario() {
        let candidates = vec![
            CandidatePoint::new("A", 19.2183, 72.9781),
            CandidatePoint::new("B", 18.5204, 73.8567),
        ];

        let nearest = resolve_nearest(mumbai(), &candidates, None)
            .into_option()
            .unwrap();

        assert_eq!(nearest.point.name, "A");
        assert!(nearest.distance_km < 25.0);

        let b = haversine_km(mumbai(), Coordinates::new(18.5204, 73.8567));
        assert!(nearest.distance_km < b);
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(resolve_nearest(mumbai(), &[], None), Resolution::NotFound);
    }

    #[test]
    fn test_all_unparsable() {
        let candidates = vec![unparsable("x"), unparsable("y")];
        assert_eq!(
            resolve_nearest(mumbai(), &candidates, None),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_missing_latitude_only_candidate() {
        let mut point = CandidatePoint::new("Dadar", 19.0178, 72.8478);
        point.lat = None;
        assert_eq!(
            resolve_nearest(mumbai(), &[point], None),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let mut missing = CandidatePoint::new("Dadar", 19.0178, 72.8478);
        missing.lat = None;
        let candidates = vec![
            missing,
            unparsable("broken"),
            CandidatePoint::new("Pune", 18.5204, 73.8567),
        ];

        let nearest = resolve_nearest(mumbai(), &candidates, None)
            .into_option()
            .unwrap();
        assert_eq!(nearest.point.name, "Pune");
    }

    #[test]
    fn test_group_filter_with_no_match() {
        let candidates = vec![
            CandidatePoint::new("A", 19.2183, 72.9781).in_group(1),
            CandidatePoint::new("B", 18.5204, 73.8567).in_group(2),
        ];
        assert_eq!(
            resolve_nearest(mumbai(), &candidates, Some(99)),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_group_filter_runs_before_search() {
        let candidates = vec![
            CandidatePoint::new("A", 19.2183, 72.9781).in_group(1),
            CandidatePoint::new("B", 18.5204, 73.8567).in_group(2),
            CandidatePoint::new("Ungrouped", 19.0761, 72.8777),
        ];

        let nearest = resolve_nearest(mumbai(), &candidates, Some(2))
            .into_option()
            .unwrap();
        assert_eq!(nearest.point.name, "B");
        assert_eq!(nearest.point.group_id, Some(2));
    }

    #[test]
    fn test_tie_goes_to_first() {
        let candidates = vec![
            CandidatePoint::new("first", 19.5, 72.8777),
            CandidatePoint::new("second", 19.5, 72.8777),
        ];

        let nearest = resolve_nearest(mumbai(), &candidates, None)
            .into_option()
            .unwrap();
        assert_eq!(nearest.point.name, "first");
    }

    #[test]
    fn test_result_is_minimal() {
        let mut candidates = Vec::new();
        for i in 0..12 {
            for j in 0..12 {
                let lat = 17.0 + i as f64 * 0.37;
                let lng = 72.0 + j as f64 * 0.29;
                candidates.push(CandidatePoint::new(format!("p{}-{}", i, j), lat, lng));
            }
        }
        let query = Coordinates::new(18.91, 73.33);

        let nearest = resolve_nearest(query, &candidates, None)
            .into_option()
            .unwrap();

        for c in &candidates {
            let d = round_to(haversine_km(query, c.coordinates().unwrap()), DISTANCE_PRECISION);
            assert!(nearest.distance_km <= d, "{} is closer than the winner", c.name);
        }
    }

    #[test]
    fn test_near_antipodal_candidate_does_not_win() {
        let query = Coordinates::new(-87.843, -179.9);
        let candidates = vec![
            CandidatePoint::new("antipode", 87.843, 0.1),
            CandidatePoint::new("close", -87.833, -179.9),
        ];

        let nearest = resolve_nearest(query, &candidates, None)
            .into_option()
            .unwrap();
        assert_eq!(nearest.point.name, "close");
        assert!(nearest.distance_km.is_finite());
        assert!(nearest.distance_km < 2.0);
    }

    #[test]
    fn test_distance_is_rounded() {
        let candidates = vec![CandidatePoint::new("A", 19.2183, 72.9781)];
        let nearest = resolve_nearest(mumbai(), &candidates, None)
            .into_option()
            .unwrap();
        assert_eq!(nearest.distance_km, round_to(nearest.distance_km, 3));
        assert_eq!(nearest.distance_km, 19.016);
    }

    #[test]
    fn test_idempotent() {
        let candidates = vec![
            CandidatePoint::new("A", 19.2183, 72.9781),
            unparsable("z"),
            CandidatePoint::new("B", 18.5204, 73.8567),
        ];
        let first = resolve_nearest(mumbai(), &candidates, None);
        let second = resolve_nearest(mumbai(), &candidates, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_nearest_serialization() {
        let mut point = CandidatePoint::new("Swargate", 18.5018, 73.8636).in_group(4);
        point.address = Some("Swargate bus stand".to_string());
        let nearest = resolve_nearest(Coordinates::new(18.5204, 73.8567), &[point], None)
            .into_option()
            .unwrap();

        let json = serde_json::to_value(&nearest).unwrap();
        assert_eq!(json["pickuppoint"], "Swargate");
        assert_eq!(json["trip_id"], 4);
        assert_eq!(json["pickup_lat"], "18.5018");
        assert!(json["distance_km"].as_f64().unwrap() > 0.0);
        assert!(json.get("id").is_none());
    }
}
