//! Market data access port.

use crate::domain::error::MomrevError;
use crate::domain::price::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Adjusted daily closes of `ticker` with `start_date <= date < end_date`,
    /// ascending by date.
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomrevError>;
}
