//! Market clock, portfolio report, quote polling and logging.

mod clock;
mod logging;
mod poller;
mod report;

#[cfg(test)]
mod testing;

pub use clock::{Clock, MarketHours, SystemClock};
pub use logging::setup_logging;
pub use poller::{QuotePoller, DEFAULT_POLL_INTERVAL};
pub use report::{report_profile, write_holdings};
