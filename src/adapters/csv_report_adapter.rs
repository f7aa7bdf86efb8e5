//! CSV export of daily and cumulative strategy returns.

use crate::domain::backtest::{BacktestResult, StrategyResult};
use crate::domain::error::MomrevError;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct CsvReportAdapter;

/// Column prefix for a strategy name: `"Mean Reversion Strategy"` becomes
/// `mean_reversion`.
fn column_prefix(name: &str) -> String {
    let trimmed = name.trim();
    let base = trimmed.strip_suffix(" Strategy").unwrap_or(trimmed);
    base.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn report_error(path: &Path, e: csv::Error) -> MomrevError {
    MomrevError::Report {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn by_date(strategy: &StrategyResult) -> BTreeMap<NaiveDate, (f64, f64)> {
    strategy
        .daily_returns
        .iter()
        .zip(&strategy.equity_curve)
        .map(|(r, p)| (r.date, (r.value, p.equity)))
        .collect()
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MomrevError> {
        let strategies = result.strategies();
        let columns: Vec<BTreeMap<NaiveDate, (f64, f64)>> =
            strategies.iter().copied().map(by_date).collect();
        let dates: BTreeSet<NaiveDate> = columns.iter().flat_map(|c| c.keys().copied()).collect();

        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| report_error(output_path, e))?;

        let mut header = vec!["date".to_string()];
        for s in &strategies {
            let prefix = column_prefix(&s.name);
            header.push(format!("{prefix}_return"));
            header.push(format!("{prefix}_value"));
        }
        wtr.write_record(&header)
            .map_err(|e| report_error(output_path, e))?;

        for date in &dates {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            for column in &columns {
                match column.get(date) {
                    Some((ret, value)) => {
                        record.push(format!("{ret:.8}"));
                        record.push(format!("{value:.8}"));
                    }
                    None => {
                        record.push(String::new());
                        record.push(String::new());
                    }
                }
            }
            wtr.write_record(&record)
                .map_err(|e| report_error(output_path, e))?;
        }
        wtr.flush()?;

        info!(path = %output_path.display(), rows = dates.len(), "wrote return series");
        Ok(())
    }
}
