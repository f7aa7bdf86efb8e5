//! Performance statistics of a daily return series.

use super::portfolio::{compound, DailyReturn, EquityPoint};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Longest stretch below a prior peak, in trading days.
    pub max_drawdown_duration: usize,
    pub trading_days: usize,
}

impl Metrics {
    pub fn compute(returns: &[DailyReturn], risk_free_rate: f64) -> Self {
        let curve = compound(returns);
        let final_equity = curve.last().map(|p| p.equity).unwrap_or(1.0);
        let total_return = final_equity - 1.0;

        let trading_days = returns.len();
        let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && final_equity > 0.0 {
            final_equity.powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&curve);
        let (annualized_volatility, sharpe_ratio) =
            compute_risk_adjusted(returns, risk_free_rate / TRADING_DAYS_PER_YEAR);

        Metrics {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            trading_days,
        }
    }
}

fn compute_drawdown(curve: &[EquityPoint]) -> (f64, usize) {
    // Peak starts at the implicit 1.0 basis so a first-day loss counts.
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    let mut duration = 0usize;
    let mut max_duration = 0usize;

    for point in curve {
        if point.equity >= peak {
            peak = point.equity;
            duration = 0;
            continue;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
        duration += 1;
        max_duration = max_duration.max(duration);
    }

    (max_dd, max_duration)
}

fn compute_risk_adjusted(returns: &[DailyReturn], daily_rf: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().map(|r| r.value).sum::<f64>() / n;
    let variance = returns
        .iter()
        .map(|r| (r.value - mean).powi(2))
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    let volatility = stddev * TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe = if stddev > 0.0 {
        (mean - daily_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (volatility, sharpe)
}
