//! Brokerage portfolio report and watchlist price monitor.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use trading_config::load_config;
use tracing::info;
use trading_monitor::setup_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging
    let log_level = cli
        .log_level
        .map(|l| l.as_str())
        .unwrap_or(config.logging.level.as_str());
    let json = cli.json_logs || config.logging.format == "json";
    let _guard = setup_logging(log_level, json, config.logging.file.as_deref());
    info!("Starting {} ({})", config.app.name, config.app.environment);

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cli::commands::run::run(&config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&config, &cli.config).await,
    }
}
