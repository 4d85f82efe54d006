//! Plotters-powered trend chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - per-series RGB colours without mapping to the 16-colour palette
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{LineStyle, Rgb, TrendChart};

/// One polyline in chart coordinates (x = days since `origin`).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub dashed: bool,
}

/// Series plus bounds, computed outside the render call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub origin: NaiveDate,
    pub series: Vec<ChartSeries>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    /// `None` when the chart has no points in its window.
    pub fn from_trend(chart: &TrendChart) -> Option<Self> {
        let origin = chart.start;
        let series: Vec<ChartSeries> = chart
            .segments
            .iter()
            .filter(|s| !s.points.is_empty())
            .map(|s| ChartSeries {
                points: s
                    .points
                    .iter()
                    .map(|p| ((p.date - origin).num_days() as f64, p.value))
                    .collect(),
                color: s.color,
                dashed: s.style == LineStyle::Dashed,
            })
            .collect();
        if series.is_empty() {
            return None;
        }

        let span = ((chart.end - chart.start).num_days() as f64).max(1.0);
        let x_bounds = [0.0, span];

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in series.iter().flat_map(|s| s.points.iter()) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if y_max <= y_min {
            y_min -= 1.0;
            y_max += 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

        Some(Self {
            origin,
            series,
            x_bounds,
            y_bounds: [y_min - pad, y_max + pad],
        })
    }

    /// Calendar date at chart coordinate `x`.
    pub fn date_at(&self, x: f64) -> NaiveDate {
        self.origin + Duration::days(x.round() as i64)
    }
}

/// Pieces actually drawn for a dashed polyline: the first half of every step.
pub fn dash_pieces(points: &[(f64, f64)]) -> Vec<[(f64, f64); 2]> {
    points
        .windows(2)
        .map(|w| {
            let (a, b) = (w[0], w[1]);
            [a, ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)]
        })
        .collect()
}

pub struct TrendPlottersChart<'a> {
    pub data: &'a ChartData,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for TrendPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.data.x_bounds;
        let [y0, y1] = self.data.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let data = self.data;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| data.date_at(*v).to_string())
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in &data.series {
                let Rgb(r, g, b) = series.color;
                let color = RGBColor(r, g, b);
                if series.dashed {
                    for piece in dash_pieces(&series.points) {
                        chart.draw_series(LineSeries::new(piece, &color))?;
                    }
                } else if series.points.len() == 1 {
                    // A lone point draws nothing as a line.
                    chart.draw_series(series.points.iter().map(|&p| Pixel::new(p, color)))?;
                } else {
                    chart.draw_series(LineSeries::new(series.points.iter().copied(), &color))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
