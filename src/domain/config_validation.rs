//! Configuration validation.
//!
//! Every key is optional; a key that is present must hold a usable value.

use crate::domain::error::MomrevError;
use crate::domain::universe::{parse_tickers, DEFAULT_TICKERS};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MomrevError> {
    let universe_size = validate_tickers(config)?;
    validate_dates(config)?;
    validate_risk_free_rate(config)?;
    validate_lookback(config)?;
    validate_selection(config, "momentum", "top_n", universe_size)?;
    validate_selection(config, "mean_reversion", "bottom_n", universe_size)?;
    validate_data_source(config)?;
    validate_report(config)?;
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<usize, MomrevError> {
    match config.get_string("backtest", "tickers") {
        None => Ok(DEFAULT_TICKERS.len()),
        Some(s) => parse_tickers(&s)
            .map(|t| t.len())
            .map_err(|e| MomrevError::config_invalid("backtest", "tickers", e.to_string())),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MomrevError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end)
        && start >= end
    {
        return Err(MomrevError::config_invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, MomrevError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                MomrevError::config_invalid(
                    "backtest",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), MomrevError> {
    let value = config.get_double("backtest", "risk_free_rate")?.unwrap_or(0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(MomrevError::config_invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), MomrevError> {
    if config.get_int("momentum", "lookback")?.unwrap_or(1) < 1 {
        return Err(MomrevError::config_invalid(
            "momentum",
            "lookback",
            "lookback must be at least 1",
        ));
    }
    Ok(())
}

fn validate_selection(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    universe_size: usize,
) -> Result<(), MomrevError> {
    let value = config.get_int(section, key)?.unwrap_or(1);
    if value < 1 || value as usize > universe_size {
        return Err(MomrevError::config_invalid(
            section,
            key,
            format!("{key} must be between 1 and the universe size ({universe_size})"),
        ));
    }
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), MomrevError> {
    match config.get_string("data", "source").as_deref().map(str::trim) {
        None | Some("yahoo") => Ok(()),
        Some("csv") => match config.get_string("data", "csv_dir") {
            Some(dir) if !dir.trim().is_empty() => Ok(()),
            _ => Err(MomrevError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            }),
        },
        Some(other) => Err(MomrevError::config_invalid(
            "data",
            "source",
            format!("unknown source '{other}', expected yahoo or csv"),
        )),
    }
}

fn validate_report(config: &dyn ConfigPort) -> Result<(), MomrevError> {
    for key in ["width", "height"] {
        chart_dimension(config, key)?;
    }
    config.get_bool("report", "summary")?;
    Ok(())
}

/// Chart width or height in pixels, if configured.
pub fn chart_dimension(config: &dyn ConfigPort, key: &str) -> Result<Option<u32>, MomrevError> {
    match config.get_int("report", key)? {
        None => Ok(None),
        Some(v) => u32::try_from(v)
            .ok()
            .filter(|v| *v > 0)
            .map(Some)
            .ok_or_else(|| {
                MomrevError::config_invalid("report", key, format!("{key} must be a positive pixel count"))
            }),
    }
}
