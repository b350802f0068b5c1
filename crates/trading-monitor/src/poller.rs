//! Watchlist price polling during market hours.

use std::io::Write;
use std::time::Duration;
use tracing::debug;
use trading_core::error::TradingResult;
use trading_core::traits::Broker;
use trading_core::types::{LatestPrice, Session, Watchlist};

use crate::clock::{Clock, MarketHours};

/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Prints the watchlist's latest prices while the market is open.
pub struct QuotePoller<'a, B: Broker + ?Sized, C: Clock + ?Sized> {
    broker: &'a B,
    session: &'a Session,
    watchlist: &'a Watchlist,
    clock: &'a C,
    hours: MarketHours,
    interval: Duration,
}

impl<'a, B: Broker + ?Sized, C: Clock + ?Sized> QuotePoller<'a, B, C> {
    pub fn new(
        broker: &'a B,
        session: &'a Session,
        watchlist: &'a Watchlist,
        clock: &'a C,
        hours: MarketHours,
    ) -> Self {
        Self {
            broker,
            session,
            watchlist,
            clock,
            hours,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll until the clock reports the market closed.
    ///
    /// Each open reading triggers exactly one fetch followed by one sleep.
    /// Fetch errors are not retried. Returns the number of polls made.
    pub async fn run<W: Write>(&self, out: &mut W) -> TradingResult<usize> {
        let mut polls = 0;

        while self.hours.is_open(self.clock) {
            let prices = self
                .broker
                .get_latest_prices(self.session, self.watchlist.symbols())
                .await?;
            writeln!(out, "Prices: {}", format_prices(&prices))?;
            out.flush()?;

            polls += 1;
            debug!("Poll {} done, sleeping {:?}", polls, self.interval);
            tokio::time::sleep(self.interval).await;
        }

        debug!("Market closed after {} polls", polls);
        Ok(polls)
    }
}

fn format_prices(prices: &[LatestPrice]) -> String {
    let joined: Vec<String> = prices.iter().map(|p| p.to_string()).collect();
    format!("[{}]", joined.join(", "))
}
