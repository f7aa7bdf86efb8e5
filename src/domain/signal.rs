//! Cross-sectional selection signals.
//!
//! A signal table shares the frame layout with prices: one row per rebalancing
//! date, one column per ticker, `Some(1.0)` for selected names and `Some(0.0)`
//! for the rest. Undefined scores are never selected.

use crate::domain::frame::Frame;
use crate::domain::resample::{resample_last, Rebalance};
use std::cmp::Ordering;

/// Trailing window of the momentum score, in trading days (about 12 months).
pub const MOMENTUM_LOOKBACK: usize = 252;
/// Names held by the momentum strategy.
pub const MOMENTUM_TOP_N: usize = 3;
/// Names held by the mean-reversion strategy.
pub const REVERSION_BOTTOM_N: usize = 3;

/// Direction a row is ranked in before taking the first `n` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Highest,
    Lowest,
}

/// Marks the `n` best-ranked defined scores of every row.
///
/// Equal scores keep the frame's column order, so the leftmost of two tied
/// tickers wins the last slot. Rows with fewer than `n` defined scores select
/// all of them.
pub fn select(scores: &Frame, n: usize, rank: Rank) -> Frame {
    let rows = scores
        .rows()
        .iter()
        .map(|row| {
            let mut ranked: Vec<(usize, f64)> = row
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
                .collect();
            ranked.sort_by(|a, b| {
                let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
                match rank {
                    Rank::Highest => ord.reverse(),
                    Rank::Lowest => ord,
                }
            });

            let mut selected = vec![Some(0.0); row.len()];
            for (col, _) in ranked.into_iter().take(n) {
                selected[col] = Some(1.0);
            }
            selected
        })
        .collect();
    scores.with_rows(rows)
}

/// Trailing `lookback`-day return of every ticker, snapshotted at month end.
pub fn momentum_scores(prices: &Frame, lookback: usize) -> Frame {
    resample_last(&prices.pct_change(lookback), Rebalance::MonthEnd)
}

/// Monthly table selecting the `top_n` names with the strongest trailing return.
pub fn momentum_signals(prices: &Frame, lookback: usize, top_n: usize) -> Frame {
    select(&momentum_scores(prices, lookback), top_n, Rank::Highest)
}

/// Week-over-week return of Friday close snapshots.
pub fn reversion_scores(prices: &Frame) -> Frame {
    resample_last(prices, Rebalance::WeeklyFriday).pct_change(1)
}

/// Weekly table selecting the `bottom_n` names with the weakest one-week return.
pub fn mean_reversion_signals(prices: &Frame, bottom_n: usize) -> Frame {
    select(&reversion_scores(prices), bottom_n, Rank::Lowest)
}

/// Number of selected names in each row.
pub fn selection_counts(signals: &Frame) -> Vec<usize> {
    signals
        .rows()
        .iter()
        .map(|row| row.iter().filter(|v| **v == Some(1.0)).count())
        .collect()
}
