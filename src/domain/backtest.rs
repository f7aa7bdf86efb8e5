//! Backtest parameters and the end-to-end pipeline from prices to equity curves.

use crate::domain::frame::Frame;
use crate::domain::portfolio::{compound, simulate, DailyReturn, EquityPoint};
use crate::domain::position::build_positions;
use crate::domain::resample::Rebalance;
use crate::domain::signal::{
    mean_reversion_signals, momentum_signals, MOMENTUM_LOOKBACK, MOMENTUM_TOP_N,
    REVERSION_BOTTOM_N,
};
use crate::domain::universe::Universe;
use chrono::NaiveDate;
use tracing::info;

pub const MOMENTUM_NAME: &str = "Momentum Strategy";
pub const MEAN_REVERSION_NAME: &str = "Mean Reversion Strategy";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub universe: Universe,
    pub start_date: NaiveDate,
    /// Exclusive upper bound of the price download.
    pub end_date: NaiveDate,
    pub lookback: usize,
    pub top_n: usize,
    pub bottom_n: usize,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            universe: Universe::default(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid calendar date"),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid calendar date"),
            lookback: MOMENTUM_LOOKBACK,
            top_n: MOMENTUM_TOP_N,
            bottom_n: REVERSION_BOTTOM_N,
            risk_free_rate: 0.0,
        }
    }
}

/// Every intermediate table of one strategy, kept for reporting and inspection.
#[derive(Debug, Clone)]
pub struct StrategyResult {
    pub name: String,
    pub rebalance: Rebalance,
    pub signals: Frame,
    pub positions: Frame,
    pub daily_returns: Vec<DailyReturn>,
    pub equity_curve: Vec<EquityPoint>,
}

impl StrategyResult {
    fn run(name: &str, rebalance: Rebalance, signals: Frame, returns: &Frame) -> Self {
        let positions = build_positions(&signals, returns.dates());
        let daily_returns = simulate(&positions, returns);
        let equity_curve = compound(&daily_returns);

        info!(
            strategy = name,
            rebalance = %rebalance,
            rebalances = signals.len(),
            days = daily_returns.len(),
            final_value = equity_curve.last().map(|p| p.equity).unwrap_or(1.0),
            "simulated strategy"
        );

        Self {
            name: name.to_string(),
            rebalance,
            signals,
            positions,
            daily_returns,
            equity_curve,
        }
    }

    pub fn final_value(&self) -> f64 {
        self.equity_curve.last().map(|p| p.equity).unwrap_or(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub returns: Frame,
    pub momentum: StrategyResult,
    pub mean_reversion: StrategyResult,
}

impl BacktestResult {
    pub fn strategies(&self) -> [&StrategyResult; 2] {
        [&self.momentum, &self.mean_reversion]
    }
}

/// Simple daily returns; sessions where any ticker's return is undefined
/// (including the first) are dropped.
pub fn daily_returns(prices: &Frame) -> Frame {
    prices.pct_change(1).drop_incomplete()
}

pub fn run_backtest(prices: &Frame, config: &BacktestConfig) -> BacktestResult {
    let returns = daily_returns(prices);
    info!(
        sessions = returns.len(),
        dropped = prices.len() - returns.len(),
        "computed daily returns"
    );

    let momentum = StrategyResult::run(
        MOMENTUM_NAME,
        Rebalance::MonthEnd,
        momentum_signals(prices, config.lookback, config.top_n),
        &returns,
    );
    let mean_reversion = StrategyResult::run(
        MEAN_REVERSION_NAME,
        Rebalance::WeeklyFriday,
        mean_reversion_signals(prices, config.bottom_n),
        &returns,
    );

    BacktestResult {
        returns,
        momentum,
        mean_reversion,
    }
}
