//! Account, holding and price types reported by the broker.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A held position in a single security, with its derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Symbol
    pub symbol: String,
    /// Instrument display name
    pub name: String,
    /// Number of shares
    pub quantity: Decimal,
    /// Average buy price
    pub average_buy_price: Decimal,
    /// Latest price
    pub price: Decimal,
    /// Market value (quantity * price)
    pub equity: Decimal,
    /// Price change against the average buy price, in percent
    pub percent_change: Decimal,
    /// Equity change against cost basis
    pub equity_change: Decimal,
    /// Share of total portfolio equity, in percent
    pub percentage: Option<Decimal>,
}

impl Holding {
    /// Build a holding from raw position data, deriving equity and changes.
    ///
    /// Derived values are rounded to cents. `portfolio_equity` is used for
    /// the percentage column and skipped when unknown or zero.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        quantity: Decimal,
        average_buy_price: Decimal,
        price: Decimal,
        portfolio_equity: Option<Decimal>,
    ) -> Self {
        let equity = quantity * price;
        let cost_basis = quantity * average_buy_price;
        let percent_change = if average_buy_price.is_zero() {
            Decimal::ZERO
        } else {
            (price - average_buy_price) * Decimal::from(100) / average_buy_price
        };
        let percentage = portfolio_equity
            .filter(|total| !total.is_zero())
            .map(|total| (equity * Decimal::from(100) / total).round_dp(2));

        Self {
            symbol: symbol.into(),
            name: name.into(),
            quantity,
            average_buy_price,
            price,
            equity: equity.round_dp(2),
            percent_change: percent_change.round_dp(2),
            equity_change: (equity - cost_basis).round_dp(2),
            percentage,
        }
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{price: {}, quantity: {}, average_buy_price: {}, equity: {}, percent_change: {}, equity_change: {}",
            self.price,
            self.quantity,
            self.average_buy_price,
            self.equity,
            self.percent_change,
            self.equity_change,
        )?;
        if let Some(percentage) = self.percentage {
            write!(f, ", percentage: {}", percentage)?;
        }
        write!(f, ", name: {}}}", self.name)
    }
}

/// Holdings keyed by symbol, in the order the broker listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingsReport {
    holdings: Vec<Holding>,
}

impl HoldingsReport {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    /// Get a holding by symbol.
    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter()
    }
}

/// Account-level figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Brokerage account number
    pub account_number: String,
    /// Buying power, if the broker reported one
    pub buying_power: Option<Decimal>,
    /// Settled cash
    pub cash: Option<Decimal>,
}

/// Latest traded price for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestPrice {
    pub symbol: String,
    pub price: Decimal,
}

impl fmt::Display for LatestPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_holding_derived_values() {
        let holding = Holding::new(
            "VTI",
            "Vanguard Total Stock Market ETF",
            dec!(10),
            dec!(200.00),
            dec!(250.00),
            Some(dec!(10000)),
        );

        assert_eq!(holding.equity, dec!(2500.00));
        assert_eq!(holding.percent_change, dec!(25.00));
        assert_eq!(holding.equity_change, dec!(500.00));
        assert_eq!(holding.percentage, Some(dec!(25.00)));
    }

    #[test]
    fn test_holding_zero_cost_basis() {
        let holding = Holding::new("DIA", "DIA", dec!(1), Decimal::ZERO, dec!(400), Some(Decimal::ZERO));
        assert_eq!(holding.percent_change, Decimal::ZERO);
        assert_eq!(holding.percentage, None);
    }

    #[test]
    fn test_report_lookup() {
        let report = HoldingsReport::new(vec![
            Holding::new("VTI", "VTI", dec!(2), dec!(100), dec!(110), None),
            Holding::new("QQQ", "QQQ", dec!(1), dec!(300), dec!(290), None),
        ]);

        assert_eq!(report.len(), 2);
        assert_eq!(report.get("QQQ").unwrap().equity_change, dec!(-10.00));
        assert_eq!(report.iter().map(|h| h.symbol.as_str()).collect::<Vec<_>>(), ["VTI", "QQQ"]);
        assert!(report.get("DIA").is_none());
    }

    #[test]
    fn test_holding_display() {
        let holding = Holding::new("VTI", "Vanguard", dec!(1), dec!(100), dec!(100), None);
        let text = holding.to_string();
        assert!(text.starts_with("{price: 100"));
        assert!(text.ends_with("name: Vanguard}"));
        assert!(!text.contains("percentage"));
    }
}
