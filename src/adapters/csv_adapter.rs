//! CSV file price data adapter.
//!
//! Reads `{base_path}/{TICKER}.csv` files in the export format. Only the
//! `date, open, high, low, close, volume` columns are used; any others (such
//! as `dividend` and `split`) are ignored.

use crate::domain::error::QfError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::{resample, PriceBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

/// Parse a whole price file, sorted by date.
pub fn read_price_file(path: &Path) -> Result<Vec<PriceBar>, QfError> {
    let content = fs::read_to_string(path).map_err(|e| QfError::DataSource {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for (line, result) in rdr.deserialize::<CsvBar>().enumerate() {
        let record = result.map_err(|e| QfError::DataSource {
            reason: format!("{}: CSV parse error: {}", path.display(), e),
        })?;

        // Accept both plain dates and pandas-style timestamps.
        let date_part = record.date.split([' ', 'T']).next().unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
            QfError::DataSource {
                reason: format!(
                    "{}: invalid date {:?} on row {}: {}",
                    path.display(),
                    record.date,
                    line + 1,
                    e
                ),
            }
        })?;

        bars.push(PriceBar {
            date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume.round() as i64,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        freq: Frequency,
    ) -> Result<Vec<PriceBar>, QfError> {
        let mut bars = read_price_file(&self.csv_path(ticker))?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);

        debug!(ticker, rows = bars.len(), %freq, "read price file");
        Ok(resample(&bars, freq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume,dividend,split\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000,0,1\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000,0,1\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000,0,1\n\
            2024-01-22,115.0,118.0,111.0,112.0,40000,0,1\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(
            path.join("TS.csv"),
            "date,open,high,low,close,volume\n2024-01-15 00:00:00,1.0,2.0,0.5,1.5,10.0\n",
        )
        .unwrap();
        fs::write(path.join("BAD.csv"), "date,open,high,low,close,volume\n15/01/2024,1,2,0,1,10\n")
            .unwrap();

        (dir, path)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn fetch_prices_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_prices("BHP", d("2024-01-15"), d("2024-01-31"), Frequency::Daily)
            .unwrap();

        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].date, d("2024-01-15"));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[3].date, d("2024-01-22"));
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_prices("BHP", d("2024-01-16"), d("2024-01-16"), Frequency::Daily)
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d("2024-01-16"));
    }

    #[test]
    fn fetch_prices_resamples_weekly() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_prices("BHP", d("2024-01-01"), d("2024-01-31"), Frequency::Weekly)
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d("2024-01-15"));
        assert_eq!(bars[0].close, 115.0);
        assert_eq!(bars[0].volume, 165_000);
        assert_eq!(bars[1].date, d("2024-01-22"));
    }

    #[test]
    fn fetch_prices_accepts_timestamps() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_prices("TS", d("2024-01-01"), d("2024-01-31"), Frequency::Daily)
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 10);
    }

    #[test]
    fn fetch_prices_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_prices("XYZ", d("2024-01-01"), d("2024-01-31"), Frequency::Daily);
        assert!(matches!(result, Err(QfError::DataSource { .. })));
    }

    #[test]
    fn fetch_prices_errors_for_bad_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_prices("BAD", d("2024-01-01"), d("2024-01-31"), Frequency::Daily);
        assert!(matches!(result, Err(QfError::DataSource { reason }) if reason.contains("15/01/2024")));
    }
}
