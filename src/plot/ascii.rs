//! ASCII plotting of an assembled trend for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a log
//! - deterministic output (helpful for golden tests)
//!
//! Each mode is drawn with its initial (`d`, `t`, `w`, ...). Forecast
//! segments are drawn dashed: every other cell along the line is left blank.

use chrono::NaiveDate;

use crate::domain::{LineStyle, TrendChart};

/// Render `chart` into a `width` x `height` character grid with a header and legend.
pub fn render_trend_plot(chart: &TrendChart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    let Some((x_min, x_max)) = date_range(chart) else {
        out.push_str(&format!(
            "Plot: {} .. {} | no data in window\n",
            chart.start, chart.end
        ));
        return out;
    };

    let (y_min, y_max) = y_range(chart).unwrap_or((-1.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let span_days = ((x_max - x_min).num_days() as f64).max(1.0);

    let mut grid = vec![vec![' '; width]; height];

    for seg in &chart.segments {
        let glyph = glyph(&seg.mode);
        let dashed = seg.style == LineStyle::Dashed;
        let mut step = 0usize;
        let mut prev: Option<(usize, usize)> = None;

        for p in &seg.points {
            let x = map_x((p.date - x_min).num_days() as f64, span_days, width);
            let y = map_y(p.value, y_min, y_max, height);
            let (x0, y0) = prev.unwrap_or((x, y));
            draw_line(&mut grid, (x0, y0), (x, y), glyph, dashed, &mut step);
            prev = Some((x, y));
        }
    }

    out.push_str(&format!(
        "Plot: {x_min} .. {x_max} | y=[{y_min:.2}, {y_max:.2}] % change\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = chart
        .legend()
        .iter()
        .map(|(mode, _)| format!("{} {}", glyph(mode), mode))
        .collect();
    out.push_str(&format!("Legend: {}", legend.join("  ")));
    if chart.segments.iter().any(|s| s.style == LineStyle::Dashed) {
        out.push_str(" | dashed = forecast");
    }
    out.push('\n');

    out
}

fn glyph(mode: &str) -> char {
    mode.chars().next().map(|c| c.to_ascii_lowercase()).unwrap_or('?')
}

fn date_range(chart: &TrendChart) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = chart.segments.iter().flat_map(|s| s.points.iter().map(|p| p.date));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn y_range(chart: &TrendChart) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in chart.segments.iter().flat_map(|s| s.points.iter()) {
        min_y = min_y.min(p.value);
        max_y = max_y.max(p.value);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(days: f64, span_days: f64, width: usize) -> usize {
    let u = (days / span_days).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Earlier series keep their cells.
///
/// `step` counts cells across calls so a dashed polyline keeps its rhythm.
fn draw_line(
    grid: &mut [Vec<char>],
    from: (usize, usize),
    to: (usize, usize),
    ch: char,
    dashed: bool,
    step: &mut usize,
) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        // The start of every piece after the first is the previous piece's end.
        let is_joint = from != to && x0 == from.0 as isize && y0 == from.1 as isize && *step > 0;
        if !is_joint {
            let visible = !dashed || *step % 2 == 0;
            let (r, c) = (y0 as usize, x0 as usize);
            if visible && r < grid.len() && c < grid[r].len() && grid[r][c] == ' ' {
                grid[r][c] = ch;
            }
            *step += 1;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
