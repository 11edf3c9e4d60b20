//! Three-panel overview of a backtest result.

use std::io::Write;

use tracing::debug;

use crate::domain::chart::{ChartStyle, Figure, LineSeries, MarkerSeries, MarkerShape, Panel};
use crate::domain::error::QfError;
use crate::domain::result_table::{signal_points, ResultRow};
use crate::ports::chart_port::ChartPort;

const TITLE_FONT_SIZE: f64 = 16.0;
const MARKER_SIZE: f64 = 10.0;

/// Build the portfolio value / price with signals / returns figure.
pub fn build_figure(rows: &[ResultRow], title: &str, currency: &str) -> Figure {
    let (buys, sells) = signal_points(rows);

    let portfolio = Panel {
        y_label: format!("portfolio value in {currency}"),
        lines: vec![LineSeries {
            label: "portfolio_value".into(),
            points: rows.iter().map(|r| (r.date, r.portfolio_value)).collect(),
        }],
        markers: vec![],
    };

    let price = Panel {
        y_label: format!("price in {currency}"),
        lines: vec![LineSeries {
            label: "price".into(),
            points: rows.iter().map(|r| (r.date, r.price)).collect(),
        }],
        markers: vec![
            MarkerSeries {
                label: "buy".into(),
                shape: MarkerShape::TriangleUp,
                color: "green".into(),
                size: MARKER_SIZE,
                points: buys,
            },
            MarkerSeries {
                label: "sell".into(),
                shape: MarkerShape::TriangleDown,
                color: "red".into(),
                size: MARKER_SIZE,
                points: sells,
            },
        ],
    };

    let returns = Panel {
        y_label: "daily returns".into(),
        lines: vec![LineSeries {
            label: "returns".into(),
            points: rows.iter().map(|r| (r.date, r.returns)).collect(),
        }],
        markers: vec![],
    };

    Figure {
        title: title.to_string(),
        title_font_size: TITLE_FONT_SIZE,
        panels: vec![portfolio, price, returns],
        show_legend: true,
    }
}

/// Render the result overview and print the final portfolio value.
///
/// Returns the final portfolio value rounded to cents.
pub fn visualize_results(
    rows: &[ResultRow],
    title: &str,
    currency: &str,
    style: &ChartStyle,
    chart: &mut dyn ChartPort,
    out: &mut dyn Write,
) -> Result<f64, QfError> {
    let last = rows.last().ok_or(QfError::EmptyResult)?;

    let figure = build_figure(rows, title, currency);
    debug!(
        title,
        rows = rows.len(),
        buys = figure.panels[1].markers[0].points.len(),
        sells = figure.panels[1].markers[1].points.len(),
        "rendering backtest overview"
    );
    chart.render(&figure, style)?;

    let final_value = (last.portfolio_value * 100.0).round_ties_even() / 100.0;
    writeln!(
        out,
        "Final portfolio value (including cash): {final_value:.2}{currency}"
    )?;
    Ok(final_value)
}
