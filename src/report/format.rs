//! Formatted terminal output for trends, the map summary, and date bounds.
//!
//! We keep formatting code in one place so output changes are localized
//! (and snapshot tests stay next to the code they pin).

use crate::domain::{DateBounds, LineStyle, TrendCase, TrendChart};
use crate::report::{CountrySummary, MapSummary};

/// Header plus one line per drawn segment.
pub fn format_trend_summary(chart: &TrendChart, notice: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Mobility trend: {} ===\n", chart.country));
    if let Some(notice) = notice {
        out.push_str(&format!("Note: {notice}\n"));
    }
    out.push_str(&format!(
        "Window: {} .. {} | {}\n",
        chart.start,
        chart.end,
        case_label(chart.case)
    ));

    out.push_str(
        format!(
            "{:<12} {:<7} {:<8} {:>6} {:<24} {:>8}\n",
            "mode", "style", "color", "points", "range", "last"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<7} {:-<8} {:-<6} {:-<24} {:-<8}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for seg in &chart.segments {
        let style = match seg.style {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
        };
        let (range, last) = match (seg.points.first(), seg.points.last()) {
            (Some(a), Some(b)) => (format!("{} .. {}", a.date, b.date), format!("{:.2}", b.value)),
            _ => ("-".to_string(), "-".to_string()),
        };
        out.push_str(
            format!(
                "{:<12} {:<7} {:<8} {:>6} {:<24} {:>8}\n",
                truncate(&seg.mode, 12),
                style,
                seg.color.hex(),
                seg.points.len(),
                range,
                last
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Countries ranked by latest average change, most depressed first.
pub fn format_map_summary(summary: &MapSummary, top: Option<usize>) -> String {
    let mut rows: Vec<&CountrySummary> = summary.rows.iter().collect();
    rows.sort_by(|a, b| match (a.change_pct, b.change_pct) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.country.cmp(&b.country),
    });
    let shown = top.unwrap_or(rows.len()).min(rows.len());

    let mut out = String::new();
    out.push_str(&format!("{}\n", summary.title()));
    out.push_str(format!("{:<32} {:>9} {:<8}\n", "country", "avg", "color").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<32} {:-<9} {:-<8}\n", "", "", "").trim_end());
    out.push('\n');

    for r in &rows[..shown] {
        let avg = r
            .change_pct
            .map(|v| format!("{:.2}%", v))
            .unwrap_or_else(|| "-".to_string());
        let color = r.color.map(|c| c.hex()).unwrap_or_else(|| "-".to_string());
        out.push_str(format!("{:<32} {:>9} {:<8}\n", truncate(&r.country, 32), avg, color).trim_end());
        out.push('\n');
    }
    if shown < rows.len() {
        out.push_str(&format!("... {} more\n", rows.len() - shown));
    }

    out
}

pub fn format_bounds(bounds: &DateBounds, include_forecast: bool) -> String {
    format!(
        "Selectable dates{}: {} .. {}\n",
        if include_forecast { " (with forecast)" } else { "" },
        bounds.min,
        bounds.max
    )
}

pub fn case_label(case: TrendCase) -> &'static str {
    match case {
        TrendCase::Historical => "observed",
        TrendCase::ForecastOnly => "forecast",
        TrendCase::Spanning => "observed + forecast",
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
