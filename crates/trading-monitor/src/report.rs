//! Account profile and holdings report.

use std::io::{self, Write};
use tracing::error;
use trading_core::traits::Broker;
use trading_core::types::{HoldingsReport, Session};

/// Print buying power and owned stocks.
///
/// The profile and holdings fetches are independent: a failure in one is
/// logged and the other is still reported. Only write errors are returned.
pub async fn report_profile<B, W>(broker: &B, session: &Session, out: &mut W) -> io::Result<()>
where
    B: Broker + ?Sized,
    W: Write,
{
    match broker.get_buying_power(session).await {
        Ok(Some(buying_power)) => writeln!(out, "Buying power = {}", buying_power)?,
        Ok(None) => writeln!(out, "Unable to retrieve buying power.")?,
        Err(e) => error!("Error retrieving profile: {}", e),
    }

    match broker.get_holdings(session).await {
        Ok(holdings) => write_holdings(&holdings, out)?,
        Err(e) => error!("Error retrieving stocks: {}", e),
    }

    Ok(())
}

/// Print holdings one per line between braces.
pub fn write_holdings<W: Write>(holdings: &HoldingsReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "Owned Stocks = {{")?;
    for holding in holdings.iter() {
        writeln!(out, "\t{} : {}", holding.symbol, holding)?;
    }
    writeln!(out, "}}")
}
