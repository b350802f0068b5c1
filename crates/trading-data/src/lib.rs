//! Historical market data sources.

mod yahoo;

pub use yahoo::{YahooConfig, YahooDataSource};
