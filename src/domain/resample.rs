//! Calendar downsampling of daily frames.

use crate::domain::frame::Frame;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt;

/// Rebalancing grid a daily frame is snapshotted onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebalance {
    /// One bucket per calendar month.
    MonthEnd,
    /// One bucket per week, weeks ending on Friday.
    WeeklyFriday,
}

impl Rebalance {
    /// Key identifying the bucket `date` falls into. Dates sharing a key share
    /// a bucket; keys are ordered like the buckets.
    pub fn bucket(self, date: NaiveDate) -> NaiveDate {
        match self {
            Rebalance::MonthEnd => last_day_of_month(date),
            Rebalance::WeeklyFriday => {
                let from_monday = date.weekday().num_days_from_monday() as i64;
                let friday = Weekday::Fri.num_days_from_monday() as i64;
                date + Duration::days((friday - from_monday).rem_euclid(7))
            }
        }
    }
}

impl fmt::Display for Rebalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rebalance::MonthEnd => write!(f, "monthly"),
            Rebalance::WeeklyFriday => write!(f, "weekly (Fri)"),
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Collapses `frame` to one row per bucket holding each column's last defined
/// value inside the bucket.
///
/// Rows are labelled with the last trading date observed in the bucket, so a
/// Friday holiday labels the week with Thursday and a month ending on a
/// weekend labels it with its last session.
pub fn resample_last(frame: &Frame, rule: Rebalance) -> Frame {
    let mut dates = Vec::new();
    let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
    let mut current: Option<NaiveDate> = None;

    for (date, row) in frame.dates().iter().zip(frame.rows()) {
        let bucket = rule.bucket(*date);
        if current != Some(bucket) {
            current = Some(bucket);
            dates.push(*date);
            rows.push(vec![None; frame.width()]);
        }
        let (Some(label), Some(snapshot)) = (dates.last_mut(), rows.last_mut()) else {
            continue;
        };
        *label = *date;
        for (slot, value) in snapshot.iter_mut().zip(row) {
            if value.is_some() {
                *slot = *value;
            }
        }
    }

    Frame::new(dates, frame.tickers().to_vec(), rows)
}
