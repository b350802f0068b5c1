//! Yahoo Finance chart API history source.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;
use trading_core::error::DataError;
use trading_core::traits::HistorySource;
use trading_core::types::{Bar, Interval, Lookback};

/// Yahoo chart API configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) trading-watch".to_string(),
        }
    }
}

/// Yahoo API response types
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Daily history from Yahoo's chart endpoint.
pub struct YahooDataSource {
    config: YahooConfig,
    client: Client,
}

impl YahooDataSource {
    /// Create a new Yahoo data source.
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DataError::Internal(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

fn at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Turn a chart response into bars, oldest first.
///
/// Rows with a missing close are dropped. When the response carries an
/// adjusted close it replaces the raw close.
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<Bar>, DataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(if err.code == "Not Found" {
            DataError::SymbolNotFound(symbol.to_string())
        } else {
            DataError::Internal(format!("{}: {}", err.code, err.description))
        });
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(DataError::NoDataAvailable)?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|c| c.adjclose);

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let close = match &adjclose {
            Some(adj) => at(adj, i).or_else(|| at(&quote.close, i)),
            None => at(&quote.close, i),
        };
        let Some(close) = close else {
            continue;
        };

        bars.push(Bar::new(
            ts * 1000,
            at(&quote.open, i).unwrap_or(close),
            at(&quote.high, i).unwrap_or(close),
            at(&quote.low, i).unwrap_or(close),
            close,
            at(&quote.volume, i).unwrap_or(0.0),
        ));
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[async_trait]
impl HistorySource for YahooDataSource {
    async fn get_history(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<Vec<Bar>, DataError> {
        let url = self.chart_url(symbol);
        let params = [
            ("range", lookback.to_string()),
            ("interval", interval.to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        // Yahoo reports unknown symbols as 404 with a chart error body
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::Internal(format!("{}: {}", status, text)));
        }

        let bars = parse_chart(symbol, &text)?;
        debug!("Fetched {} {} bars for {} ({})", bars.len(), interval, symbol, lookback);
        Ok(bars)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}
