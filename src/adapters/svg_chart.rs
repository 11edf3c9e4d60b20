//! SVG rendering of figures and a chart port that writes them to disk.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::chart::{ChartStyle, Figure, MarkerShape, Panel};
use crate::domain::error::QfError;
use crate::ports::chart_port::ChartPort;

const PADDING: f64 = 60.0;
const PANEL_GAP: f64 = 30.0;

/// Maps dates onto the shared horizontal axis.
struct DateAxis {
    first: NaiveDate,
    span_days: f64,
    left: f64,
    width: f64,
}

impl DateAxis {
    fn x(&self, date: NaiveDate) -> f64 {
        if self.span_days <= 0.0 {
            return self.left + self.width / 2.0;
        }
        let offset = (date - self.first).num_days() as f64;
        self.left + offset / self.span_days * self.width
    }
}

fn value_extent(panel: &Panel) -> Option<(f64, f64)> {
    let values = panel
        .lines
        .iter()
        .flat_map(|l| l.points.iter())
        .chain(panel.markers.iter().flat_map(|m| m.points.iter()))
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite());

    let mut extent: Option<(f64, f64)> = None;
    for v in values {
        extent = Some(match extent {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    extent
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_value(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{:.0}", value)
    } else if value.abs() >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

fn triangle(shape: MarkerShape, x: f64, y: f64, size: f64) -> String {
    let h = size / 2.0;
    match shape {
        MarkerShape::TriangleUp => format!(
            "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
            x,
            y - h,
            x - h,
            y + h,
            x + h,
            y + h
        ),
        MarkerShape::TriangleDown => format!(
            "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
            x,
            y + h,
            x - h,
            y - h,
            x + h,
            y - h
        ),
    }
}

fn render_panel(svg: &mut String, panel: &Panel, axis: &DateAxis, top: f64, height: f64, style: &ChartStyle, legend: bool) {
    let left = axis.left;
    let right = axis.left + axis.width;
    let bottom = top + height;

    let _ = writeln!(
        svg,
        r#"<rect x="{left:.1}" y="{top:.1}" width="{:.1}" height="{height:.1}" fill="{}"/>"#,
        axis.width, style.background
    );

    let (lo, hi) = value_extent(panel).unwrap_or((0.0, 1.0));
    let range = hi - lo;
    let scale_y = if range > 0.0 { height / range } else { 1.0 };
    let y_of = |v: f64| {
        if range > 0.0 {
            bottom - (v - lo) * scale_y
        } else {
            top + height / 2.0
        }
    };

    for frac in [0.25, 0.5, 0.75] {
        let y = top + height * frac;
        let _ = writeln!(
            svg,
            r#"<line x1="{left:.1}" y1="{y:.1}" x2="{right:.1}" y2="{y:.1}" stroke="{}" stroke-width="1"/>"#,
            style.grid_color
        );
    }

    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end">{}</text>"#,
        left - 6.0,
        top + 12.0,
        format_value(hi)
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{bottom:.1}" font-size="12" text-anchor="end">{}</text>"#,
        left - 6.0,
        format_value(lo)
    );
    let label_y = top + height / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{label_y:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 {:.1} {label_y:.1})">{}</text>"#,
        left - 44.0,
        left - 44.0,
        escape(&panel.y_label)
    );

    // Non-finite values break the line into separate segments.
    for line in &panel.lines {
        for segment in line.points.split(|(_, v)| !v.is_finite()) {
            if segment.is_empty() {
                continue;
            }
            let points: Vec<String> = segment
                .iter()
                .map(|(d, v)| format!("{:.1},{:.1}", axis.x(*d), y_of(*v)))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
                style.line_color,
                points.join(" ")
            );
        }
    }

    for series in &panel.markers {
        for (d, v) in series.points.iter().filter(|(_, v)| v.is_finite()) {
            let _ = writeln!(
                svg,
                r#"<polygon fill="{}" points="{}"/>"#,
                series.color,
                triangle(series.shape, axis.x(*d), y_of(*v), series.size)
            );
        }
    }

    if legend && !panel.markers.is_empty() {
        for (i, series) in panel.markers.iter().enumerate() {
            let y = top + 16.0 + i as f64 * 18.0;
            let x = right - 70.0;
            let _ = writeln!(
                svg,
                r#"<polygon fill="{}" points="{}"/><text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
                series.color,
                triangle(series.shape, x, y - 4.0, series.size),
                x + 12.0,
                y,
                escape(&series.label)
            );
        }
    }
}

/// Render a figure as a standalone SVG document.
pub fn render_svg(figure: &Figure, style: &ChartStyle) -> String {
    let width = style.pixel_width();
    let height = style.pixel_height();
    let title_height = figure.title_font_size * 2.5;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}" font-family="{}">"#,
        style.font_family
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="{}" text-anchor="middle">{}</text>"#,
        width / 2.0,
        figure.title_font_size * 1.5,
        figure.title_font_size,
        escape(&figure.title)
    );

    let Some((first, last)) = figure.date_range() else {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">No data available.</text>"#,
            width / 2.0,
            height / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    };

    let axis = DateAxis {
        first,
        span_days: (last - first).num_days() as f64,
        left: PADDING + 20.0,
        width: width - 2.0 * PADDING - 20.0,
    };

    let panel_count = figure.panels.len().max(1) as f64;
    let plot_height = height - title_height - PADDING;
    let panel_height = (plot_height - PANEL_GAP * (panel_count - 1.0)) / panel_count;

    for (i, panel) in figure.panels.iter().enumerate() {
        let top = title_height + i as f64 * (panel_height + PANEL_GAP);
        render_panel(&mut svg, panel, &axis, top, panel_height, style, figure.show_legend);
    }

    let axis_y = height - PADDING + 18.0;
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{axis_y:.1}" font-size="12" text-anchor="start">{first}</text>"#,
        axis.left
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{axis_y:.1}" font-size="12" text-anchor="end">{last}</text>"#,
        axis.left + axis.width
    );

    svg.push_str("</svg>\n");
    svg
}

/// File name stem derived from a chart title.
pub fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "chart".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes each rendered figure to `{output_dir}/{slug(title)}.svg`.
pub struct SvgChartAdapter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SvgChartAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartPort for SvgChartAdapter {
    fn render(&mut self, figure: &Figure, style: &ChartStyle) -> Result<(), QfError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| QfError::Chart {
            reason: format!("cannot create {}: {}", self.output_dir.display(), e),
        })?;

        let path = self.output_dir.join(format!("{}.svg", slug(&figure.title)));
        fs::write(&path, render_svg(figure, style)).map_err(|e| QfError::Chart {
            reason: format!("cannot write {}: {}", path.display(), e),
        })?;

        info!(path = %path.display(), "chart written");
        self.written.push(path);
        Ok(())
    }
}
