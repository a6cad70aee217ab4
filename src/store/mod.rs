//! Trip and pickup point storage
//!
//! The `TripStore` trait is the seam between HTTP handlers and the relational
//! database. Two implementations:
//! - `mysql::MySqlStore` backed by a sqlx connection pool
//! - `memory::MemoryStore` holding rows in memory (tests, offline CLI use)

pub mod memory;
pub mod mysql;

use crate::error::Result;
use crate::resolver::CandidatePoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A trip record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trip {
    pub trip_name: String,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub trip_date: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

/// Storage backend for trips and pickup points
///
/// "No rows" is an empty `Vec` or `None`, never an error.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Backend name for logs and status output
    fn name(&self) -> &'static str;

    /// All trips, in storage order
    async fn list_trips(&self) -> Result<Vec<Trip>>;

    /// A trip by exact name
    async fn find_trip(&self, name: &str) -> Result<Option<Trip>>;

    /// Trips whose name or details contain the words of `query` in order
    async fn search_trips(&self, query: &str) -> Result<Vec<Trip>>;

    /// Pickup points, optionally restricted to one trip
    async fn fetch_points(&self, group_id: Option<i64>) -> Result<Vec<CandidatePoint>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;
}

/// Build the SQL LIKE pattern for a free-text query
///
/// "ganpati pune" becomes "%ganpati%pune%".
pub fn like_pattern(query: &str) -> String {
    let words: Vec<&str> = query.split_whitespace().collect();
    format!("%{}%", words.join("%"))
}
