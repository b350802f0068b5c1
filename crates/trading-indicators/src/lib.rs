//! Moving-average indicators.
//!
//! This crate provides:
//! - Trailing and rolling simple moving averages over price slices
//! - The 50-day / 200-day moving-average report for a watchlist, computed
//!   from any [`trading_core::HistorySource`]

pub mod moving_average;
pub mod report;

pub use moving_average::{rolling_mean, trailing_mean};
pub use report::{MovingAverageCalculator, MovingAverageReport, MovingAverages, FIFTY_DAY, TWO_HUNDRED_DAY};
