//! Validate configuration command.

use anyhow::{Context, Result};
use std::path::Path;
use trading_config::AppConfig;

pub async fn run(config: &AppConfig, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    if !config_path.exists() {
        println!("File not found, using defaults and environment");
    }

    config.validate().context("Invalid configuration")?;

    let effective = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("Configuration is valid!");
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!();
    print!("{}", effective);

    Ok(())
}
