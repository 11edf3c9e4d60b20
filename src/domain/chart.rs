//! Renderer-independent chart model.
//!
//! A [`Figure`] is a stack of [`Panel`]s sharing one date axis. Adapters turn
//! it into pixels; the domain only decides what is drawn.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    TriangleUp,
    TriangleDown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSeries {
    pub label: String,
    pub shape: MarkerShape,
    pub color: String,
    pub size: f64,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub y_label: String,
    pub lines: Vec<LineSeries>,
    pub markers: Vec<MarkerSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub title_font_size: f64,
    pub panels: Vec<Panel>,
    pub show_legend: bool,
}

impl Figure {
    /// Earliest and latest date drawn in any panel.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.panels
            .iter()
            .flat_map(|p| {
                p.lines
                    .iter()
                    .flat_map(|l| l.points.iter())
                    .chain(p.markers.iter().flat_map(|m| m.points.iter()))
            })
            .map(|(d, _)| *d)
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }
}

/// Rendering parameters, passed explicitly with every figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Figure width in inches.
    pub width: f64,
    /// Figure height in inches.
    pub height: f64,
    pub dpi: f64,
    pub background: String,
    pub grid_color: String,
    pub line_color: String,
    pub font_family: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            width: 16.0,
            height: 9.0,
            dpi: 200.0,
            background: "#eaeaf2".into(),
            grid_color: "#ffffff".into(),
            line_color: "#4c72b0".into(),
            font_family: "sans-serif".into(),
        }
    }
}

impl ChartStyle {
    pub fn pixel_width(&self) -> f64 {
        self.width * self.dpi
    }

    pub fn pixel_height(&self) -> f64 {
        self.height * self.dpi
    }
}
