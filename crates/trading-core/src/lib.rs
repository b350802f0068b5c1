//! Core types and traits for the trading system.
//!
//! This crate provides the foundational building blocks including:
//! - Price history types (Bar, PriceHistory, Interval, Lookback)
//! - Account, holdings and session types
//! - The broker and history source traits

pub mod error;
pub mod traits;
pub mod types;

pub use error::{TradingError, TradingResult};
pub use traits::*;
pub use types::*;
