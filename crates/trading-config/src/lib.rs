//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, BrokerSettings, CredentialsSettings, CredentialsSource,
    HistorySettings, LoggingConfig, MarketSettings, WatchlistSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// The file is optional; every setting has a default. Environment variables
/// use the `TRADING` prefix and `__` as the section separator, e.g.
/// `TRADING__MARKET__POLL_INTERVAL_SECS=5`. `TRADING__WATCHLIST__SYMBOLS`
/// takes a comma-separated list. The result is checked with
/// [`AppConfig::validate`].
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_with_env(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix("TRADING")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("watchlist.symbols")
        .try_parsing(true)
}

fn load_with_env(path: &Path, env: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(env)
        .build()?;

    let config: AppConfig = config.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
