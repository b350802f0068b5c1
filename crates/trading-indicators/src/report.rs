//! 50/200-day moving averages for a watchlist.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use trading_core::error::IndicatorError;
use trading_core::traits::HistorySource;
use trading_core::types::{Interval, Lookback, PriceHistory, Watchlist};

use crate::moving_average::trailing_mean;

/// Short moving-average window, in daily bars.
pub const FIFTY_DAY: usize = 50;

/// Long moving-average window, in daily bars.
pub const TWO_HUNDRED_DAY: usize = 200;

/// Trailing averages for one symbol. NaN when history is too short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub fifty_day_avg: f64,
    pub two_hundred_day_avg: f64,
}

impl MovingAverages {
    /// Compute both averages from closes ordered oldest to newest.
    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            fifty_day_avg: trailing_mean(closes, FIFTY_DAY),
            two_hundred_day_avg: trailing_mean(closes, TWO_HUNDRED_DAY),
        }
    }
}

/// Moving averages keyed by symbol, in watchlist order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageReport {
    entries: Vec<(String, MovingAverages)>,
}

impl MovingAverageReport {
    pub fn get(&self, symbol: &str) -> Option<&MovingAverages> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, averages)| averages)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MovingAverages)> {
        self.entries.iter().map(|(s, a)| (s.as_str(), a))
    }

    fn insert(&mut self, symbol: &str, averages: MovingAverages) {
        self.entries.push((symbol.to_string(), averages));
    }
}

impl fmt::Display for MovingAverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (symbol, averages)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}: {{50_day_MA: {:.4}, 200_day_MA: {:.4}}}",
                symbol, averages.fifty_day_avg, averages.two_hundred_day_avg
            )?;
        }
        write!(f, "}}")
    }
}

/// Computes the moving-average report from a history source.
pub struct MovingAverageCalculator<'a, S: HistorySource + ?Sized> {
    source: &'a S,
    lookback: Lookback,
}

impl<'a, S: HistorySource + ?Sized> MovingAverageCalculator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            lookback: Lookback::OneYear,
        }
    }

    pub fn with_lookback(mut self, lookback: Lookback) -> Self {
        self.lookback = lookback;
        self
    }

    /// Fetch daily history for every symbol and compute its averages.
    ///
    /// Stops at the first symbol whose history cannot be fetched.
    pub async fn calculate(&self, watchlist: &Watchlist) -> Result<MovingAverageReport, IndicatorError> {
        let mut report = MovingAverageReport::default();

        for symbol in watchlist.iter() {
            let bars = self
                .source
                .get_history(symbol, Interval::Day, self.lookback)
                .await
                .map_err(|source| IndicatorError::History {
                    symbol: symbol.to_string(),
                    source,
                })?;

            let history = PriceHistory::new(symbol, bars);
            if history.len() < TWO_HUNDRED_DAY {
                warn!(
                    "{} has {} daily bars from {}, long average undefined",
                    symbol,
                    history.len(),
                    self.source.name()
                );
            }

            let averages = MovingAverages::from_closes(&history.closes());
            debug!("{} averages: {:?}", symbol, averages);
            report.insert(symbol, averages);
        }

        Ok(report)
    }
}
