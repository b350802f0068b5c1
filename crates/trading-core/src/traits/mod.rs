//! Core traits for the trading system.

mod broker;
mod history;

pub use broker::Broker;
pub use history::HistorySource;
