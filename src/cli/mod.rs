//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod nearest;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};

/// Trip chatbot backend and nearest pickup point finder
#[derive(Parser)]
#[command(name = "trip-guide")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Find the pickup point nearest to a location
    Nearest(nearest::NearestArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show server and configuration status
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Nearest(args) => nearest::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}
