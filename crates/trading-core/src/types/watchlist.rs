//! Watchlist of monitored symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbols monitored when no watchlist is configured.
pub const DEFAULT_WATCHLIST: [&str; 3] = ["VTI", "QQQ", "DIA"];

/// Ordered, fixed set of ticker symbols.
///
/// Built once at startup; there is no way to mutate it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist(Vec<String>);

impl Watchlist {
    /// Create a watchlist, upper-casing symbols and dropping blanks and repeats.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        Self(out)
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new(DEFAULT_WATCHLIST)
    }
}

impl fmt::Display for Watchlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
