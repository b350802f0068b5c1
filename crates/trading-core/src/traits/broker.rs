//! Broker trait definition.

use crate::error::BrokerError;
use crate::types::{AccountProfile, HoldingsReport, LatestPrice, LoginRequest, Session};
use async_trait::async_trait;

/// Trait for brokerage integrations.
///
/// Login produces a [`Session`]; every other call takes it explicitly.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Authenticate and open a session.
    async fn login(&self, request: &LoginRequest) -> Result<Session, BrokerError>;

    /// Terminate a session.
    ///
    /// Does not check that the session is still valid.
    async fn logout(&self, session: &Session) -> Result<(), BrokerError>;

    /// Get account information.
    async fn get_account(&self, session: &Session) -> Result<AccountProfile, BrokerError>;

    /// Get all held positions with their derived values.
    async fn get_holdings(&self, session: &Session) -> Result<HoldingsReport, BrokerError>;

    /// Get the latest traded price for each symbol, in request order.
    ///
    /// # Arguments
    /// * `symbols` - Symbols to price
    async fn get_latest_prices(
        &self,
        session: &Session,
        symbols: &[String],
    ) -> Result<Vec<LatestPrice>, BrokerError>;

    /// Get the buying power, if the account reports one.
    async fn get_buying_power(
        &self,
        session: &Session,
    ) -> Result<Option<rust_decimal::Decimal>, BrokerError> {
        let account = self.get_account(session).await?;
        Ok(account.buying_power)
    }

    /// Get the broker name.
    fn name(&self) -> &str;
}
