//! Adjusted close observation for one ticker on one trading day.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    /// Split and dividend adjusted close.
    pub close: f64,
}

impl PriceBar {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            close,
        }
    }

    /// A usable close is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn positive_close_is_valid() {
        assert!(PriceBar::new("AAPL", day(), 185.2).is_valid());
    }

    #[test]
    fn zero_negative_and_nan_are_invalid() {
        assert!(!PriceBar::new("AAPL", day(), 0.0).is_valid());
        assert!(!PriceBar::new("AAPL", day(), -1.0).is_valid());
        assert!(!PriceBar::new("AAPL", day(), f64::NAN).is_valid());
        assert!(!PriceBar::new("AAPL", day(), f64::INFINITY).is_valid());
    }
}
