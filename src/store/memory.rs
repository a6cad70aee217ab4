//! In-memory storage backend
//!
//! Holds trips and pickup points in vectors. Loadable from a JSON file of the
//! form `{"trips": [...], "pickuppoints": [...]}` so the `nearest` command can
//! run without a database.

use crate::error::{Error, Result};
use crate::resolver::CandidatePoint;
use crate::store::{Trip, TripStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// In-memory store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    trips: Vec<Trip>,
    #[serde(default, rename = "pickuppoints")]
    points: Vec<CandidatePoint>,
}

impl MemoryStore {
    /// Create a store from existing rows
    pub fn new(trips: Vec<Trip>, points: Vec<CandidatePoint>) -> Self {
        Self { trips, points }
    }

    /// Load a store from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Case-insensitive ordered match of `words` inside `haystack`, like SQL `%a%b%`
fn contains_in_order(haystack: &str, words: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    let mut rest = haystack.as_str();
    for word in words {
        match rest.find(word.as_str()) {
            Some(idx) => rest = &rest[idx + word.len()..],
            None => return false,
        }
    }
    true
}

#[async_trait]
impl TripStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_trips(&self) -> Result<Vec<Trip>> {
        Ok(self.trips.clone())
    }

    async fn find_trip(&self, name: &str) -> Result<Option<Trip>> {
        Ok(self.trips.iter().find(|t| t.trip_name == name).cloned())
    }

    async fn search_trips(&self, query: &str) -> Result<Vec<Trip>> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        Ok(self
            .trips
            .iter()
            .filter(|t| {
                contains_in_order(&t.trip_name, &words)
                    || t.details
                        .as_deref()
                        .map_or(false, |d| contains_in_order(d, &words))
            })
            .cloned()
            .collect())
    }

    async fn fetch_points(&self, group_id: Option<i64>) -> Result<Vec<CandidatePoint>> {
        Ok(self
            .points
            .iter()
            .filter(|p| group_id.map_or(true, |g| p.group_id == Some(g)))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
