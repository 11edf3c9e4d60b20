//! Loaders for backtest result tables and return series stored as CSV.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::domain::error::QfError;
use crate::domain::result_table::{ResultRow, Transaction};
use crate::domain::returns::ReturnPoint;

#[derive(Debug, Deserialize)]
struct ResultRecord {
    date: String,
    portfolio_value: f64,
    price: f64,
    returns: f64,
    #[serde(default)]
    transactions: String,
}

#[derive(Debug, Deserialize)]
struct ReturnRecord {
    date: String,
    returns: String,
}

fn parse_row_date(path: &Path, line: usize, value: &str) -> Result<NaiveDate, QfError> {
    let date_part = value.split([' ', 'T']).next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| QfError::Csv {
        reason: format!("{}: invalid date {:?} on row {}", path.display(), value, line),
    })
}

/// Parse `;`-separated signed amounts, e.g. `100` or `-50;25`.
fn parse_transactions(path: &Path, line: usize, field: &str) -> Result<Vec<Transaction>, QfError> {
    field
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map(Transaction::new).map_err(|_| QfError::Csv {
                reason: format!(
                    "{}: invalid transaction amount {:?} on row {}",
                    path.display(),
                    s,
                    line
                ),
            })
        })
        .collect()
}

/// Read a table with columns `date, portfolio_value, price, returns, transactions`.
pub fn read_result_table(path: &Path) -> Result<Vec<ResultRow>, QfError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for (i, result) in rdr.deserialize::<ResultRecord>().enumerate() {
        let line = i + 1;
        let record = result?;
        rows.push(ResultRow {
            date: parse_row_date(path, line, &record.date)?,
            portfolio_value: record.portfolio_value,
            price: record.price,
            transactions: parse_transactions(path, line, &record.transactions)?,
            returns: record.returns,
        });
    }

    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

/// Read a `date, returns` series. Blank return cells become `NaN`.
pub fn read_returns(path: &Path) -> Result<Vec<ReturnPoint>, QfError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut series = Vec::new();

    for (i, result) in rdr.deserialize::<ReturnRecord>().enumerate() {
        let line = i + 1;
        let record = result?;
        let raw = record.returns.trim();
        let value = if raw.is_empty() {
            warn!(line, "blank return treated as missing");
            f64::NAN
        } else {
            raw.parse::<f64>().map_err(|_| QfError::Csv {
                reason: format!("{}: invalid return {:?} on row {}", path.display(), raw, line),
            })?
        };
        series.push(ReturnPoint {
            date: parse_row_date(path, line, &record.date)?,
            value,
        });
    }

    series.sort_by_key(|p| p.date);
    Ok(series)
}
