//! Price-data source port trait.

use crate::domain::error::QfError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `ticker` dated within `[start_date, end_date]`, ascending.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        freq: Frequency,
    ) -> Result<Vec<PriceBar>, QfError>;
}
