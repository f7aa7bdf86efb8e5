//! Ticker universe and price table loading.
//!
//! Parses ticker lists from configuration and pulls adjusted closes for every
//! member through a [`DataPort`]. Any member that cannot be loaded aborts the
//! run; a partial universe would silently change the portfolio denominator.

use crate::domain::error::MomrevError;
use crate::domain::frame::Frame;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

/// Ten large, diversified S&P 500 names, in alphabetical column order.
pub const DEFAULT_TICKERS: [&str; 10] = [
    "AAPL", "AMZN", "GOOGL", "JPM", "META", "MSFT", "NVDA", "PG", "UNH", "XOM",
];

/// Fewest usable closes a ticker needs to produce one daily return.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub tickers: Vec<String>,
}

impl Universe {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers }
    }

    pub fn count(&self) -> usize {
        self.tickers.len()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new(DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Fetches every ticker of `universe` and aligns the closes into one table.
///
/// Columns keep universe order. Bars with a non-positive or non-finite close
/// are discarded before alignment; a ticker left with fewer than [`MIN_BARS`]
/// aborts the load.
pub fn load_price_table(
    data_port: &dyn DataPort,
    universe: &Universe,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Frame, MomrevError> {
    let mut series = Vec::with_capacity(universe.count());

    for ticker in &universe.tickers {
        let bars = data_port.fetch_closes(ticker, start_date, end_date)?;
        let fetched = bars.len();
        let bars: Vec<_> = bars.into_iter().filter(|b| b.is_valid()).collect();
        if bars.is_empty() {
            return Err(MomrevError::NoData {
                ticker: ticker.clone(),
            });
        }
        if bars.len() < MIN_BARS {
            return Err(MomrevError::InsufficientData {
                ticker: ticker.clone(),
                bars: bars.len(),
                minimum: MIN_BARS,
            });
        }
        if bars.len() < fetched {
            debug!(ticker = %ticker, dropped = fetched - bars.len(), "discarded unusable closes");
        }
        info!(ticker = %ticker, bars = bars.len(), "loaded adjusted closes");
        series.push((ticker.clone(), bars));
    }

    let table = Frame::from_bars(&series);
    info!(
        tickers = table.width(),
        sessions = table.len(),
        "aligned price table"
    );
    Ok(table)
}
