//! Core data types for the trading system.

mod holding;
mod ohlcv;
mod range;
mod session;
mod watchlist;

pub use holding::{AccountProfile, Holding, HoldingsReport, LatestPrice};
pub use ohlcv::{Bar, PriceHistory};
pub use range::{Interval, Lookback};
pub use session::{LoginRequest, MfaChallenge, Session};
pub use watchlist::{Watchlist, DEFAULT_WATCHLIST};
