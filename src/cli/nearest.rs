//! Nearest command handler
//!
//! Resolves the pickup point closest to a location from the command line,
//! against the configured database or a JSON file of points.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::get_geocoder;
use crate::resolver::{resolve_nearest, NearestPoint};
use crate::store::memory::MemoryStore;
use crate::store::mysql::MySqlStore;
use crate::store::TripStore;
use clap::Args;
use std::path::PathBuf;

/// Nearest command arguments
#[derive(Args)]
pub struct NearestArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Named place (geocoded)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub place: Option<String>,

    /// Only consider pickup points of this trip
    #[arg(long, short = 't')]
    pub trip_id: Option<i64>,

    /// Read pickup points from a JSON file instead of the database
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the nearest command
pub async fn run(args: NearestArgs) -> Result<()> {
    let config = Config::load_effective()?;

    let location = if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        Coordinates::new(lat, lng)
    } else if let Some(place) = &args.place {
        let geocoder = get_geocoder(&config)?;
        match geocoder.geocode(place).await? {
            Some(location) => {
                eprintln!("Geocoded to: {}", location.display_name);
                location.coordinates()
            }
            None => {
                return Err(Error::Geocoding(format!("Could not geocode '{}'", place)));
            }
        }
    } else {
        return Err(Error::InvalidRequest(
            "No location specified. Use --lat/--lng or --place".to_string(),
        ));
    };

    location.validate()?;

    let store: Box<dyn TripStore> = match &args.points {
        Some(path) => Box::new(MemoryStore::from_json_file(path)?),
        None => Box::new(MySqlStore::connect_lazy(&config.database)?),
    };

    let points = store.fetch_points(args.trip_id).await?;
    let nearest = resolve_nearest(location, &points, args.trip_id)
        .into_option()
        .ok_or_else(|| Error::NotFound("no pickup points found".to_string()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&nearest)?);
    } else {
        print_nearest(&nearest);
    }

    Ok(())
}

fn print_nearest(nearest: &NearestPoint) {
    let point = &nearest.point;
    println!("{} ({} km)", point.name, nearest.distance_km);

    if let Some(address) = point.address.as_deref().filter(|a| !a.is_empty()) {
        println!("  Address: {}", address);
    }
    if let (Some(lat), Some(lng)) = (&point.lat, &point.lng) {
        println!("  Location: {}, {}", lat.trim(), lng.trim());
    }
    if let Some(trip_id) = point.group_id {
        println!("  Trip: {}", trip_id);
    }
}
