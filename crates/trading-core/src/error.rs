//! Error types for the trading system.

use thiserror::Error;

/// Top-level trading system error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential and one-time password errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to read credentials from {path}: {source}")]
    CredentialsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Invalid TOTP secret: {0}")]
    InvalidSecret(String),

    #[error("Login failed: {0}")]
    Login(#[from] BrokerError),
}

/// Broker-specific errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("MFA challenge required: {0}")]
    ChallengeRequired(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Session store error: {0}")]
    SessionStore(String),
}

/// Data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("History unavailable for {symbol}: {source}")]
    History {
        symbol: String,
        #[source]
        source: DataError,
    },
}

/// Result type alias for trading operations.
pub type TradingResult<T> = Result<T, TradingError>;
