//! Per-country map summary: latest average change and its colour.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{CountrySet, Rgb, SeriesTable};
use crate::trend::scale_color;

pub mod format;

pub use format::*;

/// One country's map entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    /// Mean change across modes on the latest date, rounded to 2 decimals.
    pub change_pct: Option<f64>,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub date: NaiveDate,
    pub rows: Vec<CountrySummary>,
}

impl MapSummary {
    pub fn title(&self) -> String {
        format!("Avg % Change on: {}", self.date)
    }

    pub fn get(&self, country: &str) -> Option<&CountrySummary> {
        self.rows.iter().find(|r| r.country == country)
    }
}

/// Summarize the latest historical date for every country.
///
/// Blank cells are skipped when averaging; a country with no values on that
/// date has no summary value and no colour.
pub fn summarize_latest(table: &SeriesTable, countries: &CountrySet) -> Option<MapSummary> {
    let date = table.last_date()?;
    let last = table.dates().len() - 1;

    let names: Vec<&str> = countries.iter().collect();
    let values: Vec<(String, Option<f64>)> = names
        .par_iter()
        .map(|&country| {
            let present: Vec<f64> = table
                .modes(country)
                .into_iter()
                .filter_map(|mode| table.series(country, mode).and_then(|v| v[last]))
                .collect();
            let mean = (!present.is_empty())
                .then(|| round2(present.iter().sum::<f64>() / present.len() as f64));
            (country.to_string(), mean)
        })
        .collect();

    let (min, max) = values
        .iter()
        .filter_map(|(_, v)| *v)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let rows = values
        .into_iter()
        .map(|(country, change_pct)| CountrySummary {
            color: change_pct.map(|v| scale_color(v, min, max)),
            country,
            change_pct,
        })
        .collect();

    Some(MapSummary { date, rows })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 12, day).unwrap()
    }

    fn table() -> SeriesTable {
        let mut t = SeriesTable::new(vec![d(7), d(8)]).unwrap();
        t.insert_series("Chile", "driving", vec![Some(0.0), Some(-10.0)]).unwrap();
        t.insert_series("Chile", "walking", vec![Some(0.0), Some(-20.005)]).unwrap();
        t.insert_series("Chile", "transit", vec![Some(0.0), None]).unwrap();
        t.insert_series("Peru", "driving", vec![Some(5.0), Some(30.0)]).unwrap();
        t.insert_series("Laos", "driving", vec![Some(5.0), None]).unwrap();
        t
    }

    #[test]
    fn averages_latest_row_skipping_blanks() {
        let t = table();
        let summary = summarize_latest(&t, &CountrySet::from_table(&t)).unwrap();
        assert_eq!(summary.date, d(8));
        assert_eq!(summary.title(), "Avg % Change on: 2020-12-08");

        let chile = summary.get("Chile").unwrap();
        assert_eq!(chile.change_pct, Some(-15.0));
        assert_eq!(summary.get("Peru").unwrap().change_pct, Some(30.0));

        let laos = summary.get("Laos").unwrap();
        assert_eq!(laos.change_pct, None);
        assert_eq!(laos.color, None);
    }

    #[test]
    fn colours_span_the_observed_range() {
        let t = table();
        let summary = summarize_latest(&t, &CountrySet::from_table(&t)).unwrap();
        assert_eq!(summary.get("Chile").unwrap().color, Some(scale_color(-15.0, -15.0, 30.0)));
        assert_eq!(summary.get("Peru").unwrap().color, Some(Rgb(236, 218, 154)));
    }

    #[test]
    fn rows_follow_country_order() {
        let t = table();
        let summary = summarize_latest(&t, &CountrySet::from_table(&t)).unwrap();
        let names: Vec<&str> = summary.rows.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Chile", "Laos", "Peru"]);
    }

    #[test]
    fn empty_table_has_no_summary() {
        assert!(summarize_latest(&SeriesTable::default(), &CountrySet::default()).is_none());
    }
}
