//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides $PORT)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Config file, then environment, then flags
    let mut config = Config::load_effective()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        "Starting trip-guide server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );
    if config.api_keys.openai.is_empty() {
        info!("OPENAI_API_KEY not set; chat has no language model fallback");
    }
    if !config.scraper.enabled {
        info!("Website search disabled");
    }

    server::run(config).await
}
