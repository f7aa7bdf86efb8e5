//! Yahoo Finance chart API data adapter.
//!
//! Queries `/v8/finance/chart/{ticker}` for daily bars between two Unix
//! timestamps and returns the split and dividend adjusted closes.

use crate::domain::error::MomrevError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; momrev/0.1)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Seconds east of UTC for the listing exchange.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, MomrevError> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    /// Client against a different chart endpoint (mirrors, proxies, test servers).
    pub fn with_base_url(base_url: &str) -> Result<Self, MomrevError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MomrevError::DataSource {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=div%2Csplit&includeAdjustedClose=true",
            self.base_url,
            ticker,
            unix_seconds(start_date),
            unix_seconds(end_date),
        )
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Decodes a chart response body into ascending adjusted closes.
///
/// Timestamps are converted to exchange-local calendar dates. Sessions with a
/// null close are skipped. When the provider omits the adjusted series the raw
/// close is used and a warning is logged.
pub fn parse_chart(
    ticker: &str,
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PriceBar>, MomrevError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| MomrevError::DataSource {
            reason: format!("{ticker}: malformed chart response: {e}"),
        })?;

    if let Some(err) = response.chart.error {
        return Err(MomrevError::DataSource {
            reason: format!("{ticker}: {} ({})", err.description, err.code),
        });
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MomrevError::NoData {
            ticker: ticker.to_string(),
        })?;

    let timestamps = data.timestamp.unwrap_or_default();
    let adjusted = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);
    let closes = match adjusted {
        Some(closes) => closes,
        None => {
            warn!(ticker, "no adjusted closes in response, using raw closes");
            data.indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default()
        }
    };

    let mut bars: Vec<PriceBar> = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let date = DateTime::from_timestamp(ts + data.meta.gmtoffset, 0)?.date_naive();
            Some(PriceBar::new(ticker, date, close?))
        })
        .filter(|bar| bar.date >= start_date && bar.date < end_date)
        .collect();
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    Ok(bars)
}

impl DataPort for YahooAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomrevError> {
        let url = self.chart_url(ticker, start_date, end_date);
        debug!(ticker, %url, "requesting chart");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| MomrevError::DataSource {
                reason: format!("{ticker}: request failed: {e}"),
            })?;
        let status = response.status();
        let body = response.text().map_err(|e| MomrevError::DataSource {
            reason: format!("{ticker}: failed to read response: {e}"),
        })?;

        // The chart API reports unknown symbols as 404 with an error payload.
        if !status.is_success() && !body.contains("\"chart\"") {
            return Err(MomrevError::DataSource {
                reason: format!("{ticker}: HTTP {status}"),
            });
        }

        parse_chart(ticker, &body, start_date, end_date)
    }
}
