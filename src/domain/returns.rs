//! Periodic return series.

use chrono::NaiveDate;

use super::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Period-over-period change of closing prices, dated at the later bar.
///
/// A non-positive previous close yields `NaN` for that period.
pub fn simple_returns(bars: &[PriceBar]) -> Vec<ReturnPoint> {
    bars.windows(2)
        .map(|w| {
            let prev = w[0].close;
            let value = if prev > 0.0 {
                w[1].close / prev - 1.0
            } else {
                f64::NAN
            };
            ReturnPoint {
                date: w[1].date,
                value,
            }
        })
        .collect()
}

pub fn values(series: &[ReturnPoint]) -> Vec<f64> {
    series.iter().map(|p| p.value).collect()
}
