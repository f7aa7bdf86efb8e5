//! Date x ticker tables and the row/column transforms the pipeline is built from.
//!
//! A [`Frame`] holds one row per date (strictly ascending) and one column per
//! ticker. Cells are `Option<f64>`: `None` marks a value that is undefined on
//! that date (no observation yet, warm-up of a trailing window, before the
//! first rebalance).

use crate::domain::price::PriceBar;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl Frame {
    /// Builds a frame from pre-shaped rows.
    ///
    /// Every row must have one cell per ticker and dates must be strictly
    /// ascending.
    pub(crate) fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        assert_eq!(dates.len(), rows.len(), "one row per date");
        assert!(
            rows.iter().all(|r| r.len() == tickers.len()),
            "one cell per ticker"
        );
        assert!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "dates strictly ascending"
        );
        Self {
            dates,
            tickers,
            rows,
        }
    }

    /// Aligns per-ticker close series onto the union of their dates.
    ///
    /// Column order follows `series` order. A ticker with no bar on a date
    /// that another ticker traded is `None` there.
    pub fn from_bars(series: &[(String, Vec<PriceBar>)]) -> Self {
        let timeline: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, bars)| bars.iter().map(|b| b.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position: HashMap<NaiveDate, usize> = timeline
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i))
            .collect();

        let mut rows = vec![vec![None; series.len()]; timeline.len()];
        for (col, (_, bars)) in series.iter().enumerate() {
            for bar in bars {
                rows[position[&bar.date]][col] = Some(bar.close);
            }
        }

        let tickers = series.iter().map(|(t, _)| t.clone()).collect();
        Self::new(timeline, tickers, rows)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &[Option<f64>] {
        &self.rows[index]
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn width(&self) -> usize {
        self.tickers.len()
    }

    pub fn ticker_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn get(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        let row = self.date_index(date)?;
        let col = self.ticker_index(ticker)?;
        self.rows[row][col]
    }

    pub fn column(&self, ticker: &str) -> Option<Vec<Option<f64>>> {
        let col = self.ticker_index(ticker)?;
        Some(self.rows.iter().map(|r| r[col]).collect())
    }

    /// Same dates and tickers, new rows.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Option<f64>>>) -> Self {
        Self::new(self.dates.clone(), self.tickers.clone(), rows)
    }

    /// Percent change over `periods` rows: `value[t] / value[t - periods] - 1`.
    ///
    /// Gaps inside a column are padded with the last observation before
    /// differencing, so a missing print yields a zero return rather than
    /// poisoning the next two rows. Leading gaps stay undefined, as does any
    /// row with fewer than `periods` predecessors.
    pub fn pct_change(&self, periods: usize) -> Frame {
        let padded = self.forward_filled();
        let rows = (0..self.len())
            .map(|i| {
                (0..self.width())
                    .map(|j| {
                        if i < periods {
                            return None;
                        }
                        match (padded[i - periods][j], padded[i][j]) {
                            (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                            _ => None,
                        }
                    })
                    .collect()
            })
            .collect();
        self.with_rows(rows)
    }

    /// Drops every row holding at least one undefined cell.
    pub fn drop_incomplete(&self) -> Frame {
        let (dates, rows): (Vec<_>, Vec<_>) = self
            .dates
            .iter()
            .zip(&self.rows)
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(d, r)| (*d, r.clone()))
            .unzip();
        Self::new(dates, self.tickers.clone(), rows)
    }

    /// Re-expresses the frame on `index`, carrying each column's latest
    /// defined value forward.
    ///
    /// A value dated `d` applies from `d` onwards, including when `d` itself
    /// is not part of `index`. Dates in `index` before the first row are
    /// undefined.
    pub fn reindex_ffill(&self, index: &[NaiveDate]) -> Frame {
        let mut carried: Vec<Option<f64>> = vec![None; self.width()];
        let mut next = 0;
        let mut rows = Vec::with_capacity(index.len());

        for date in index {
            while next < self.len() && self.dates[next] <= *date {
                for (slot, value) in carried.iter_mut().zip(&self.rows[next]) {
                    if value.is_some() {
                        *slot = *value;
                    }
                }
                next += 1;
            }
            rows.push(carried.clone());
        }

        Self::new(index.to_vec(), self.tickers.clone(), rows)
    }

    /// Moves every row `periods` rows later; the first `periods` rows become
    /// undefined and the last `periods` rows fall off.
    pub fn shift(&self, periods: usize) -> Frame {
        let rows = (0..self.len())
            .map(|i| {
                if i < periods {
                    vec![None; self.width()]
                } else {
                    self.rows[i - periods].clone()
                }
            })
            .collect();
        self.with_rows(rows)
    }

    fn forward_filled(&self) -> Vec<Vec<Option<f64>>> {
        let mut carried: Vec<Option<f64>> = vec![None; self.width()];
        self.rows
            .iter()
            .map(|row| {
                for (slot, value) in carried.iter_mut().zip(row) {
                    if value.is_some() {
                        *slot = *value;
                    }
                }
                carried.clone()
            })
            .collect()
    }
}
