//! Historical data source trait.

use crate::error::DataError;
use crate::types::{Bar, Interval, Lookback};
use async_trait::async_trait;

/// Provider of historical bars.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch bars for `symbol` reaching `lookback` back from today.
    ///
    /// Bars come back oldest first.
    async fn get_history(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<Vec<Bar>, DataError>;

    fn name(&self) -> &str;
}
