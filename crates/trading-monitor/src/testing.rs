//! Fakes shared by this crate's tests.

use async_trait::async_trait;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use trading_core::error::BrokerError;
use trading_core::traits::Broker;
use trading_core::types::{AccountProfile, HoldingsReport, LatestPrice, LoginRequest, Session};

use crate::clock::Clock;

/// Broker with canned answers. Errors are given as messages.
pub struct FakeBroker {
    pub buying_power: Result<Option<Decimal>, String>,
    pub holdings: Result<HoldingsReport, String>,
    pub prices: Result<Vec<LatestPrice>, String>,
    pub price_calls: AtomicUsize,
}

impl Default for FakeBroker {
    fn default() -> Self {
        Self {
            buying_power: Ok(None),
            holdings: Ok(HoldingsReport::default()),
            prices: Ok(Vec::new()),
            price_calls: AtomicUsize::new(0),
        }
    }
}

fn api_error(msg: &str) -> BrokerError {
    BrokerError::ApiError(msg.to_string())
}

#[async_trait]
impl Broker for FakeBroker {
    async fn login(&self, _request: &LoginRequest) -> Result<Session, BrokerError> {
        Ok(Session::new("Bearer", "fake"))
    }

    async fn logout(&self, _session: &Session) -> Result<(), BrokerError> {
        Ok(())
    }

    async fn get_account(&self, _session: &Session) -> Result<AccountProfile, BrokerError> {
        let buying_power = self.buying_power.clone().map_err(|e| api_error(&e))?;
        Ok(AccountProfile {
            account_number: "5RH00000".into(),
            buying_power,
            cash: None,
        })
    }

    async fn get_holdings(&self, _session: &Session) -> Result<HoldingsReport, BrokerError> {
        self.holdings.clone().map_err(|e| api_error(&e))
    }

    async fn get_latest_prices(
        &self,
        _session: &Session,
        _symbols: &[String],
    ) -> Result<Vec<LatestPrice>, BrokerError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        self.prices.clone().map_err(|e| api_error(&e))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Clock returning a fixed sequence of readings, then midnight.
pub struct ScriptedClock {
    readings: Mutex<VecDeque<NaiveTime>>,
}

impl ScriptedClock {
    pub fn new(readings: impl IntoIterator<Item = NaiveTime>) -> Self {
        Self {
            readings: Mutex::new(readings.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.readings.lock().unwrap().len()
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> NaiveTime {
        self.readings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}
