//! Price history export in the eight-column bundle ingestion format.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::chart::{ChartStyle, Figure, LineSeries, Panel};
use crate::domain::error::{parse_date, QfError};
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::PriceBar;
use crate::ports::chart_port::ChartPort;
use crate::ports::data_port::DataPort;

pub const EXPORT_COLUMNS: [&str; 8] = [
    "date", "open", "high", "low", "close", "volume", "dividend", "split",
];

#[derive(Debug, Serialize)]
struct ExportRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    dividend: i64,
    split: i64,
}

impl From<&PriceBar> for ExportRow {
    fn from(bar: &PriceBar) -> Self {
        ExportRow {
            date: bar.date.format("%Y-%m-%d").to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            dividend: 0,
            split: 1,
        }
    }
}

/// Write bars with a header row, adding `dividend = 0` and `split = 1`.
pub fn write_bars<W: Write>(bars: &[PriceBar], writer: W) -> Result<(), QfError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in bars {
        wtr.serialize(ExportRow::from(bar))?;
    }
    if bars.is_empty() {
        wtr.write_record(EXPORT_COLUMNS)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn closing_price_figure(ticker: &str, start: &str, end: &str, bars: &[PriceBar]) -> Figure {
    Figure {
        title: format!("{ticker} prices --- {start}:{end}"),
        title_font_size: 12.0,
        panels: vec![Panel {
            y_label: "close".into(),
            lines: vec![LineSeries {
                label: "close".into(),
                points: bars.iter().map(|b| (b.date, b.close)).collect(),
            }],
            markers: vec![],
        }],
        show_legend: false,
    }
}

/// Download price history, store it at `path` and chart the closing price.
///
/// Returns the number of rows written.
#[allow(clippy::too_many_arguments)]
pub fn download_csv_data(
    data: &dyn DataPort,
    ticker: &str,
    start_date: &str,
    end_date: &str,
    path: &Path,
    freq: Frequency,
    style: &ChartStyle,
    chart: &mut dyn ChartPort,
) -> Result<usize, QfError> {
    let start: NaiveDate = parse_date(start_date)?;
    let end: NaiveDate = parse_date(end_date)?;

    debug!(ticker, %start, %end, %freq, "downloading price history");
    let bars = data.fetch_prices(ticker, start, end, freq)?;
    if bars.is_empty() {
        return Err(QfError::NoData {
            ticker: ticker.to_string(),
            start: start_date.to_string(),
            end: end_date.to_string(),
        });
    }

    let file = std::fs::File::create(path)?;
    write_bars(&bars, file)?;
    info!(ticker, rows = bars.len(), path = %path.display(), "wrote price history");

    chart.render(&closing_price_figure(ticker, start_date, end_date, &bars), style)?;
    Ok(bars.len())
}
