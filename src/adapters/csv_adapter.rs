//! CSV directory data adapter.
//!
//! One file per ticker, `<dir>/<TICKER>.csv`, with a header row naming a
//! `date` column (YYYY-MM-DD) and a close column. An `adj_close` /
//! `adj close` column is preferred over `close` when both are present, so
//! exports from most data vendors load unchanged.

use crate::domain::error::MomrevError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// Writes `bars` in the format [`DataPort::fetch_closes`] reads back.
    pub fn write_closes(&self, ticker: &str, bars: &[PriceBar]) -> Result<PathBuf, MomrevError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.csv_path(ticker);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| csv_error(&path, e))?;
        wtr.write_record(["date", "close"])
            .map_err(|e| csv_error(&path, e))?;
        for bar in bars {
            wtr.write_record([bar.date.format("%Y-%m-%d").to_string(), bar.close.to_string()])
                .map_err(|e| csv_error(&path, e))?;
        }
        wtr.flush()?;
        Ok(path)
    }
}

fn csv_error(path: &Path, e: csv::Error) -> MomrevError {
    MomrevError::DataSource {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

impl DataPort for CsvAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomrevError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| MomrevError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| csv_error(&path, e))?.clone();
        let date_col = column_index(&headers, &["date"]).ok_or_else(|| MomrevError::DataSource {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let close_col = column_index(&headers, &["adj_close", "adj close", "adjclose", "close"])
            .ok_or_else(|| MomrevError::DataSource {
                reason: format!("{}: missing close column", path.display()),
            })?;

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_error(&path, e))?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                MomrevError::DataSource {
                    reason: format!("{} row {}: invalid date '{}': {}", path.display(), line + 1, date_str, e),
                }
            })?;
            if date < start_date || date >= end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or_default().trim();
            if close_str.is_empty() {
                debug!(ticker, %date, "skipping row without close");
                continue;
            }
            let close: f64 = close_str.parse().map_err(|e| MomrevError::DataSource {
                reason: format!("{} row {}: invalid close '{}': {}", path.display(), line + 1, close_str, e),
            })?;

            bars.push(PriceBar::new(ticker, date, close));
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
