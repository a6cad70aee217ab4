//! trip-guide: Trip chatbot backend
//!
//! A library and server for a tour operator's trip chatbot. Its core is the
//! nearest-pickup-point resolver: given where the traveller is, find the
//! closest boarding point by great-circle distance.
//!
//! ## Features
//!
//! - Haversine nearest-point resolution with malformed rows skipped
//! - Trip catalog and pickup points from MySQL (or a JSON file)
//! - Chat flow: pickups, trip search with hotel details, site search, LLM
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_guide::coord::Coordinates;
//! use trip_guide::resolver::{resolve_nearest, CandidatePoint};
//!
//! let mumbai = Coordinates::new(19.0760, 72.8777);
//! let points = vec![
//!     CandidatePoint::new("Thane", 19.2183, 72.9781),
//!     CandidatePoint::new("Pune", 18.5204, 73.8567),
//! ];
//!
//! let nearest = resolve_nearest(mumbai, &points, None).into_option().unwrap();
//! println!("{} is {} km away", nearest.point.name, nearest.distance_km);
//! ```

pub mod chat;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod geo;
pub mod hotels;
pub mod llm;
pub mod resolver;
pub mod server;
pub mod site;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use resolver::{resolve_nearest, CandidatePoint, NearestPoint, Resolution};
