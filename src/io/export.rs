//! Export an assembled trend to CSV or JSON.
//!
//! The CSV export is meant to be easy to consume in spreadsheets: one row per
//! point, long format, with the line style so forecast rows can be filtered.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{LineStyle, TrendChart};
use crate::error::AppError;

/// Write one row per point: `country,mode,date,change_pct,style,color`.
pub fn write_trend_csv<W: Write>(out: W, chart: &TrendChart) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["country", "transportation_type", "date", "change_pct", "style", "color"])
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for segment in &chart.segments {
        let style = match segment.style {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
        };
        let color = segment.color.to_string();
        for p in &segment.points {
            let date = p.date.to_string();
            let value = format!("{:.2}", p.value);
            writer
                .write_record([
                    chart.country.as_str(),
                    segment.mode.as_str(),
                    date.as_str(),
                    value.as_str(),
                    style,
                    color.as_str(),
                ])
                .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
        }
    }
    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}

pub fn write_trend_csv_file(path: &Path, chart: &TrendChart) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    let mut out = std::io::BufWriter::new(file);
    write_trend_csv(&mut out, chart)?;
    out.flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}

pub fn write_trend_json_file(path: &Path, chart: &TrendChart) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create export JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, chart)
        .map_err(|e| AppError::runtime(format!("Failed to write export JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{Rgb, TrendCase, TrendPoint, TrendSegment};

    fn chart() -> TrendChart {
        let d = |day| NaiveDate::from_ymd_opt(2021, 2, day).unwrap();
        TrendChart {
            country: "Korea, South".to_string(),
            case: TrendCase::Spanning,
            start: d(2),
            end: d(3),
            segments: vec![
                TrendSegment {
                    mode: "driving".to_string(),
                    style: LineStyle::Solid,
                    color: Rgb(99, 110, 250),
                    show_legend: true,
                    points: vec![TrendPoint { date: d(2), value: -12.346 }],
                },
                TrendSegment {
                    mode: "driving".to_string(),
                    style: LineStyle::Dashed,
                    color: Rgb(99, 110, 250),
                    show_legend: false,
                    points: vec![TrendPoint { date: d(3), value: 4.0 }],
                },
            ],
        }
    }

    #[test]
    fn csv_export_golden() {
        let mut buf = Vec::new();
        write_trend_csv(&mut buf, &chart()).unwrap();
        let expected = concat!(
            "country,transportation_type,date,change_pct,style,color\n",
            "\"Korea, South\",driving,2021-02-02,-12.35,solid,#636EFA\n",
            "\"Korea, South\",driving,2021-02-03,4.00,dashed,#636EFA\n",
        );
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn csv_export_reads_back_names_with_commas_and_quotes() {
        let mut chart = chart();
        chart.country = "Korea, \"South\"".to_string();
        let mut buf = Vec::new();
        write_trend_csv(&mut buf, &chart).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Korea, \"South\"");
        assert_eq!(&rows[1][3], "4.00");
    }

    #[test]
    fn json_export_round_trips_through_serde_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.json");
        write_trend_json_file(&path, &chart()).unwrap();
        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["case"], "spanning");
        assert_eq!(value["segments"][1]["style"], "dashed");
        assert_eq!(value["segments"][1]["show_legend"], false);
        assert_eq!(value["segments"][0]["points"][0]["date"], "2021-02-02");
    }
}
