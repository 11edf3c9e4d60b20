#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use qfkit::domain::chart::{ChartStyle, Figure};
use qfkit::domain::error::QfError;
use qfkit::domain::frequency::Frequency;
pub use qfkit::domain::ohlcv::PriceBar;
use qfkit::domain::result_table::{ResultRow, Transaction};
use qfkit::ports::chart_port::ChartPort;
use qfkit::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, NaiveDate, NaiveDate, Frequency)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        freq: Frequency,
    ) -> Result<Vec<PriceBar>, QfError> {
        self.requests
            .borrow_mut()
            .push((ticker.to_string(), start_date, end_date, freq));
        if let Some(reason) = self.errors.get(ticker) {
            return Err(QfError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingChart {
    pub figures: Vec<(Figure, ChartStyle)>,
}

impl ChartPort for RecordingChart {
    fn render(&mut self, figure: &Figure, style: &ChartStyle) -> Result<(), QfError> {
        self.figures.push((figure.clone(), style.clone()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Bars for every weekday from `start` to `end`, skipping `holidays`.
pub fn trading_days(start: NaiveDate, end: NaiveDate, holidays: &[NaiveDate]) -> Vec<PriceBar> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .filter(|d| !holidays.contains(d))
        .enumerate()
        .map(|(i, date)| PriceBar {
            date,
            open: 100.0 + i as f64,
            high: 101.0 + i as f64,
            low: 99.0 + i as f64,
            close: 100.5 + i as f64,
            volume: 10_000 + i as i64,
        })
        .collect()
}

pub fn make_row(date: NaiveDate, value: f64, price: f64, amounts: &[f64]) -> ResultRow {
    ResultRow {
        date,
        portfolio_value: value,
        price,
        transactions: amounts.iter().map(|&a| Transaction::new(a)).collect(),
        returns: 0.0,
    }
}
