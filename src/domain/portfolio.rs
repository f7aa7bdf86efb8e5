//! Portfolio return simulation and compounding.

use crate::domain::frame::Frame;
use chrono::NaiveDate;

/// Portfolio return earned over one trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub value: f64,
}

/// Value of $1 invested at the start of the series, after the day's return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Daily portfolio returns of `positions` applied to `returns`.
///
/// Each day averages `position * return` over every ticker with both values
/// defined. Unheld tickers contribute zero but still count, so with `n` names
/// held out of `u` the book is only `n / u` invested. Days without any defined
/// product are skipped. Both frames must share dates and column order.
pub(crate) fn simulate(positions: &Frame, returns: &Frame) -> Vec<DailyReturn> {
    assert_eq!(positions.dates(), returns.dates(), "frames share dates");
    assert_eq!(positions.tickers(), returns.tickers(), "frames share columns");

    positions
        .dates()
        .iter()
        .zip(positions.rows().iter().zip(returns.rows()))
        .filter_map(|(date, (held, moved))| {
            let products: Vec<f64> = held
                .iter()
                .zip(moved)
                .filter_map(|(p, r)| Some((*p)? * (*r)?))
                .collect();
            if products.is_empty() {
                return None;
            }
            Some(DailyReturn {
                date: *date,
                value: products.iter().sum::<f64>() / products.len() as f64,
            })
        })
        .collect()
}

/// Running product of `1 + r`, starting from an implicit basis of 1.0.
pub fn compound(returns: &[DailyReturn]) -> Vec<EquityPoint> {
    returns
        .iter()
        .scan(1.0_f64, |equity, r| {
            *equity *= 1.0 + r.value;
            Some(EquityPoint {
                date: r.date,
                equity: *equity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn frame(rows: Vec<Vec<Option<f64>>>) -> Frame {
        let dates = (0..rows.len()).map(|i| d(i as u32 + 1)).collect();
        let tickers = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        Frame::new(dates, tickers, rows)
    }

    fn series(values: &[f64]) -> Vec<DailyReturn> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DailyReturn {
                date: d(i as u32 + 1),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn mean_divides_by_universe_size() {
        let positions = frame(vec![vec![Some(1.0), Some(1.0), Some(0.0), Some(0.0)]]);
        let returns = frame(vec![vec![Some(0.04), Some(0.02), Some(0.5), Some(-0.5)]]);

        let daily = simulate(&positions, &returns);

        assert_eq!(daily.len(), 1);
        assert_relative_eq!(daily[0].value, 0.015, epsilon = 1e-12);
    }

    #[test]
    fn days_without_positions_are_dropped() {
        let positions = frame(vec![
            vec![None, None, None, None],
            vec![Some(0.0), Some(1.0), Some(0.0), Some(0.0)],
        ]);
        let returns = frame(vec![
            vec![Some(0.01), Some(0.01), Some(0.01), Some(0.01)],
            vec![Some(0.01), Some(0.08), Some(0.01), Some(0.01)],
        ]);

        let daily = simulate(&positions, &returns);

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, d(2));
        assert_relative_eq!(daily[0].value, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn all_zero_selection_earns_nothing() {
        let positions = frame(vec![vec![Some(0.0); 4]]);
        let returns = frame(vec![vec![Some(0.03), Some(-0.01), Some(0.2), Some(0.0)]]);
        let daily = simulate(&positions, &returns);
        assert_eq!(daily[0].value, 0.0);
    }

    #[test]
    #[should_panic(expected = "frames share dates")]
    fn misaligned_frames_are_rejected() {
        let positions = frame(vec![vec![Some(1.0); 4], vec![Some(1.0); 4]]);
        let returns = frame(vec![vec![Some(0.01); 4]]);
        simulate(&positions, &returns);
    }

    #[test]
    fn compound_starts_from_one() {
        let curve = compound(&series(&[0.10, -0.10, 0.05]));

        assert_eq!(curve.len(), 3);
        assert_relative_eq!(curve[0].equity, 1.10, epsilon = 1e-12);
        assert_relative_eq!(curve[1].equity, 0.99, epsilon = 1e-12);
        assert_relative_eq!(curve[2].equity, 1.0395, epsilon = 1e-12);
    }

    #[test]
    fn zero_returns_stay_flat() {
        let curve = compound(&series(&[0.0; 20]));
        assert!(curve.iter().all(|p| p.equity == 1.0));
    }

    #[test]
    fn compound_empty() {
        assert!(compound(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn compounding_matches_stepwise_product(
            values in proptest::collection::vec(-0.2f64..0.2, 1..28),
        ) {
            let curve = compound(&series(&values));
            let mut running = 1.0;
            for (point, r) in curve.iter().zip(&values) {
                running *= 1.0 + r;
                prop_assert!((point.equity - running).abs() < 1e-12);
            }
            let whole: f64 = values.iter().map(|r| 1.0 + r).product();
            prop_assert!((curve.last().unwrap().equity - whole).abs() < 1e-9);
        }

        #[test]
        fn equity_never_negative_when_returns_bounded_below(
            values in proptest::collection::vec(-1.0f64..1.0, 1..28),
        ) {
            prop_assert!(compound(&series(&values)).iter().all(|p| p.equity >= 0.0));
        }
    }
}
