//! Configuration structures.

use chrono::NaiveTime;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trading_core::types::{Lookback, Watchlist, DEFAULT_WATCHLIST};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub credentials: CredentialsSettings,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub watchlist: WatchlistSettings,
    #[serde(default)]
    pub history: HistorySettings,
}

impl AppConfig {
    /// Reject settings the watch loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.open >= self.market.close {
            return Err(ConfigError::Message(format!(
                "market.open ({}) must be before market.close ({})",
                self.market.open, self.market.close
            )));
        }

        if self.market.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "market.poll_interval_secs must be at least 1".to_string(),
            ));
        }

        if self.watchlist.watchlist().is_empty() {
            return Err(ConfigError::Message("watchlist.symbols is empty".to_string()));
        }

        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "trading-watch".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rolling log file, in addition to stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Brokerage API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    pub base_url: String,
    /// OAuth client id; the broker's public app id when unset
    pub client_id: Option<String>,
    pub scope: String,
    /// Session lifetime requested at login, in seconds
    pub expires_in: u64,
    /// Fixed device token; a random one is generated per run when unset
    pub device_token: Option<String>,
    /// Where the fallback login keeps its session
    pub token_path: PathBuf,
    /// Environment variable holding the MFA backup code
    pub backup_code_env: String,
    pub logout_on_exit: bool,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.robinhood.com".to_string(),
            client_id: None,
            scope: "internal".to_string(),
            expires_in: 86_400,
            device_token: None,
            token_path: PathBuf::from(".tokens/robinhood.json"),
            backup_code_env: "BROKER_MFA_BACKUP_CODE".to_string(),
            logout_on_exit: true,
        }
    }
}

/// Where login secrets are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsSource {
    /// Three-line text file: username, password, TOTP secret
    #[default]
    File,
    /// Environment variables
    Env,
}

/// Credential source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsSettings {
    pub source: CredentialsSource,
    pub path: PathBuf,
    pub username_env: String,
    pub password_env: String,
    pub totp_secret_env: String,
}

impl Default for CredentialsSettings {
    fn default() -> Self {
        Self {
            source: CredentialsSource::File,
            path: PathBuf::from("login_info.txt"),
            username_env: "BROKER_USERNAME".to_string(),
            password_env: "BROKER_PASSWORD".to_string(),
            totp_secret_env: "BROKER_TOTP_SECRET".to_string(),
        }
    }
}

/// Market session window, local wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub poll_interval_secs: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 59, 0).unwrap_or_default(),
            poll_interval_secs: 30,
        }
    }
}

/// Symbols to report on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlistSettings {
    pub symbols: Vec<String>,
}

impl Default for WatchlistSettings {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WatchlistSettings {
    /// Normalized watchlist.
    pub fn watchlist(&self) -> Watchlist {
        Watchlist::new(&self.symbols)
    }
}

/// Market-data provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub base_url: String,
    pub user_agent: String,
    pub lookback: Lookback,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) trading-watch".to_string(),
            lookback: Lookback::OneYear,
        }
    }
}
