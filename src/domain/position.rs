//! Daily holdings derived from a rebalancing signal table.

use crate::domain::frame::Frame;
use chrono::NaiveDate;

/// Trading days between a signal and the first day it is held.
pub const EXECUTION_LAG: usize = 1;

/// Expands `signals` onto the daily `index` and lags it by one session.
///
/// The holding on day `t` is the decision known at the close of day `t - 1`;
/// each decision stays in force until the next rebalancing row supersedes it.
/// Days before the first decision (plus the lag) are undefined.
pub fn build_positions(signals: &Frame, index: &[NaiveDate]) -> Frame {
    signals.reindex_ffill(index).shift(EXECUTION_LAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn signals() -> Frame {
        Frame::new(
            vec![d(3), d(5)],
            vec!["A".into(), "B".into()],
            vec![
                vec![Some(1.0), Some(0.0)],
                vec![Some(0.0), Some(1.0)],
            ],
        )
    }

    #[test]
    fn holding_starts_the_session_after_the_signal() {
        let index = [d(2), d(3), d(4), d(5), d(8)];
        let positions = build_positions(&signals(), &index);

        assert_eq!(positions.dates(), &index);
        assert_eq!(positions.row(0), &[None, None]);
        assert_eq!(positions.row(1), &[None, None]);
        assert_eq!(positions.row(2), &[Some(1.0), Some(0.0)]);
        assert_eq!(positions.row(3), &[Some(1.0), Some(0.0)]);
        assert_eq!(positions.row(4), &[Some(0.0), Some(1.0)]);
    }

    #[test]
    fn position_equals_previous_filled_signal() {
        let index = [d(2), d(3), d(4), d(5), d(8), d(9)];
        let filled = signals().reindex_ffill(&index);
        let positions = build_positions(&signals(), &index);

        for t in 1..index.len() {
            assert_eq!(positions.row(t), filled.row(t - 1));
        }
    }

    #[test]
    fn empty_signals_yield_undefined_positions() {
        let empty = Frame::new(vec![], vec!["A".into()], vec![]);
        let positions = build_positions(&empty, &[d(2), d(3)]);
        assert_eq!(positions.column("A").unwrap(), vec![None, None]);
    }
}
