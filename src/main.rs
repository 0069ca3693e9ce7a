// src/main.rs

//! jobscout CLI
//!
//! Discovers company career pages and one representative open position for a
//! batch of companies sourced from a job-listing search URL.

use clap::Parser;

use jobscout::error::Result;
use jobscout::models::{Config, Credentials};
use jobscout::pipeline;
use jobscout::utils::log;

/// jobscout - Career page and open position discovery
#[derive(Parser, Debug)]
#[command(
    name = "jobscout",
    version,
    about = "Discovers company career pages and open positions from job-listing search results"
)]
struct Cli {
    /// Job-listing search URL to source companies from
    listing_url: String,

    /// Maximum companies to process (clamped to 1-50)
    #[arg(long, default_value_t = 50)]
    max: usize,

    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    log::init(if cli.verbose { "debug" } else { "info" });

    let config = Config::load_or_default(&cli.config);
    let credentials = Credentials::from_env();

    if let Err(e) = pipeline::run_pipeline(&config, &credentials, &cli.listing_url, cli.max).await {
        log::error(&format!("Run aborted: {e}"));
        return Err(e);
    }

    Ok(())
}
