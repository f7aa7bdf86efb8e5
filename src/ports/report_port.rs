//! Report generation port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MomrevError;
use std::path::Path;

/// Port for writing backtest artifacts.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MomrevError>;
}
