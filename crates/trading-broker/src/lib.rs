//! Broker integrations.

mod robinhood;
mod token_store;

#[cfg(test)]
mod testing;

pub use robinhood::{RobinhoodBroker, RobinhoodConfig, DEFAULT_CLIENT_ID};
pub use token_store::TokenStore;
