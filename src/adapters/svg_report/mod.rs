//! SVG chart report adapter.
//!
//! Writes both strategies' cumulative return curves to a single standalone
//! SVG file.

pub mod chart;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MomrevError;
use crate::ports::report_port::ReportPort;
use chart::{render_svg, ChartOptions, ChartSeries};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Default)]
pub struct SvgReportAdapter {
    options: ChartOptions,
}

impl SvgReportAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            options: ChartOptions {
                width: f64::from(width),
                height: f64::from(height),
                ..ChartOptions::default()
            },
        }
    }

    pub fn render(&self, result: &BacktestResult) -> String {
        let strategies = result.strategies();
        let series: Vec<ChartSeries> = strategies
            .iter()
            .map(|s| ChartSeries {
                label: &s.name,
                points: &s.equity_curve,
            })
            .collect();
        render_svg(&series, &self.options)
    }
}

impl ReportPort for SvgReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), MomrevError> {
        let svg = self.render(result);
        if svg.is_empty() {
            return Err(MomrevError::Report {
                reason: "no cumulative returns to plot".to_string(),
            });
        }

        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, svg).map_err(|e| MomrevError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;

        info!(path = %output_path.display(), "wrote chart");
        Ok(())
    }
}
