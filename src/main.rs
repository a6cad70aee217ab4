//! trip-guide CLI entry point
//!
//! Trip chatbot backend - CLI + web server

use trip_guide::cli;

#[tokio::main]
async fn main() {
    // Settings may come from a .env file in the working directory
    dotenv::dotenv().ok();

    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
