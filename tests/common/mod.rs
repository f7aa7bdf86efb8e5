#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use momrev::domain::backtest::BacktestConfig;
use momrev::domain::error::MomrevError;
use momrev::domain::frame::Frame;
pub use momrev::domain::price::PriceBar;
use momrev::domain::universe::Universe;
use momrev::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomrevError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(MomrevError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date < end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive weekdays starting at or after `start`.
pub fn trading_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = start;
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day = day.succ_opt().unwrap();
    }
    days
}

pub fn make_bars(ticker: &str, dates: &[NaiveDate], closes: &[f64]) -> Vec<PriceBar> {
    dates
        .iter()
        .zip(closes)
        .map(|(d, c)| PriceBar::new(ticker, *d, *c))
        .collect()
}

/// Deterministic wiggly price path; `seed` varies drift and cycle per ticker.
pub fn price_path(seed: usize, count: usize) -> Vec<f64> {
    let drift = 0.0004 * (seed as f64 - 1.0);
    let cycle = 0.05 + 0.03 * seed as f64;
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 * (1.0 + drift).powf(t) * (1.0 + 0.08 * (t * cycle).sin())
        })
        .collect()
}

/// Price table of `tickers` on `count` weekdays from 2020-01-01.
pub fn synthetic_prices(tickers: &[&str], count: usize) -> Frame {
    let dates = trading_days(date(2020, 1, 1), count);
    let series: Vec<(String, Vec<PriceBar>)> = tickers
        .iter()
        .enumerate()
        .map(|(seed, t)| (t.to_string(), make_bars(t, &dates, &price_path(seed, count))))
        .collect();
    Frame::from_bars(&series)
}

pub fn mock_port(tickers: &[&str], count: usize) -> MockDataPort {
    let dates = trading_days(date(2020, 1, 1), count);
    tickers
        .iter()
        .enumerate()
        .fold(MockDataPort::new(), |port, (seed, t)| {
            port.with_bars(t, make_bars(t, &dates, &price_path(seed, count)))
        })
}

pub fn small_config(tickers: &[&str], lookback: usize, top_n: usize, bottom_n: usize) -> BacktestConfig {
    BacktestConfig {
        universe: Universe::new(tickers.iter().map(|t| t.to_string()).collect()),
        start_date: date(2020, 1, 1),
        end_date: date(2030, 1, 1),
        lookback,
        top_n,
        bottom_n,
        risk_free_rate: 0.0,
    }
}
