//! Status command handler
//!
//! Shows the effective configuration and whether the server is up.

use crate::config::Config;
use crate::error::Result;
use crate::server::routes::HealthResponse;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load_effective()?;

    println!("trip-guide v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if args.server {
        check_server_status(&config).await;
    }

    println!("Database: {}", database_summary(&config));
    println!("Geocoder: {}", config.geocoding.provider);
    println!(
        "Hotels:   {}",
        configured(!config.api_keys.google_maps.is_empty(), "Google Places")
    );
    println!(
        "LLM:      {}",
        configured(
            config.llm.enabled && !config.api_keys.openai.is_empty(),
            &config.llm.model
        )
    );
    println!(
        "Scraper:  {}",
        configured(config.scraper.enabled, &config.scraper.base_url)
    );

    Ok(())
}

fn configured(enabled: bool, what: &str) -> String {
    if enabled {
        what.to_string()
    } else {
        "disabled".to_string()
    }
}

/// Connection target without credentials
fn database_summary(config: &Config) -> String {
    let db = &config.database;
    if !db.url.is_empty() {
        return "mysql (from url)".to_string();
    }
    if db.name.is_empty() {
        return "not configured".to_string();
    }
    format!("mysql://{}@{}:{}/{}", db.user, db.host, db.port, db.name)
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/health", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) if response.status().is_success() => {
            println!("Server: RUNNING on {}", config.server_addr());
            if let Ok(health) = response.json::<HealthResponse>().await {
                println!("  Version:  {}", health.version);
                println!(
                    "  Store:    {} ({})",
                    health.store,
                    if health.database { "up" } else { "down" }
                );
                println!("  Uptime:   {}s", health.uptime_secs);
            }
        }
        Ok(response) => {
            println!("Server: ERROR (status {})", response.status());
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}
