//! OHLCV price bars and resampling.

use chrono::{Datelike, NaiveDate};

use super::frequency::Frequency;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Aggregate ascending daily bars into weekly (ISO week) or monthly buckets.
///
/// Each bucket takes the first open, highest high, lowest low, last close and
/// summed volume, and is dated at its first trading day. Daily input is
/// returned unchanged.
pub fn resample(bars: &[PriceBar], freq: Frequency) -> Vec<PriceBar> {
    if freq == Frequency::Daily {
        return bars.to_vec();
    }

    let bucket_key = |date: NaiveDate| -> (i32, u32) {
        match freq {
            Frequency::Daily => (date.year(), date.ordinal()),
            Frequency::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Frequency::Monthly => (date.year(), date.month()),
        }
    };

    let mut out: Vec<PriceBar> = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;

    for bar in bars {
        let key = bucket_key(bar.date);
        match out.last_mut() {
            Some(agg) if current_key == Some(key) => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                out.push(bar.clone());
                current_key = Some(key);
            }
        }
    }

    out
}
