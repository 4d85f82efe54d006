//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - held in memory as read-only tables for the lifetime of the process
//! - exported to JSON/CSV
//! - handed to any front-end (text plot, TUI) without conversion

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::AppError;

/// Country used whenever a requested country has no data.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Values of one `(country, mode)` series, aligned with the table's dates.
///
/// `None` marks a blank cell in the source.
pub type SeriesValues = Vec<Option<f64>>;

/// A date × (country, transportation mode) table of percent change from baseline.
///
/// Invariants:
/// - `dates` are unique and strictly ascending
/// - every series has exactly one value per date (the table is dense)
/// - modes within a country iterate in lexical order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    dates: Vec<NaiveDate>,
    series: BTreeMap<String, BTreeMap<String, SeriesValues>>,
}

impl SeriesTable {
    /// Create an empty table over `dates`.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, AppError> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AppError::input(format!(
                "Dates must be unique and ascending ('{}' followed by '{}').",
                pair[0], pair[1]
            )));
        }
        Ok(Self {
            dates,
            series: BTreeMap::new(),
        })
    }

    /// Add one `(country, mode)` series. Duplicates and misaligned lengths are rejected.
    pub fn insert_series(
        &mut self,
        country: &str,
        mode: &str,
        values: SeriesValues,
    ) -> Result<(), AppError> {
        if values.len() != self.dates.len() {
            return Err(AppError::input(format!(
                "Series {country}/{mode} has {} values for {} dates.",
                values.len(),
                self.dates.len()
            )));
        }
        let modes = self.series.entry(country.to_string()).or_default();
        if modes.contains_key(mode) {
            return Err(AppError::input(format!("Duplicate series {country}/{mode}.")));
        }
        modes.insert(mode.to_string(), values);
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Whether `date` is one of the table's index dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Index range of dates inside `[start, end]` (empty when `start > end`).
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Range<usize> {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        lo..hi.max(lo)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.series.contains_key(country)
    }

    /// Modes reported for `country`, in lexical order. Empty for unknown countries.
    pub fn modes(&self, country: &str) -> Vec<&str> {
        self.series
            .get(country)
            .map(|modes| modes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn series(&self, country: &str, mode: &str) -> Option<&[Option<f64>]> {
        self.series
            .get(country)
            .and_then(|modes| modes.get(mode))
            .map(Vec::as_slice)
    }

    /// Value of one cell, `None` when the cell is blank or the key is unknown.
    pub fn value(&self, country: &str, mode: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.series(country, mode).and_then(|values| values[idx])
    }

    /// Number of `(country, mode)` series.
    pub fn series_count(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.series.is_empty()
    }
}

/// Distinct country names with data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySet {
    names: BTreeSet<String>,
}

impl CountrySet {
    pub fn from_table(table: &SeriesTable) -> Self {
        Self {
            names: table.countries().map(str::to_string).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CountrySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything the dashboard serves from, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub historical: SeriesTable,
    pub forecast: SeriesTable,
    pub countries: CountrySet,
}

impl Dataset {
    pub fn new(historical: SeriesTable, forecast: SeriesTable) -> Self {
        let countries = CountrySet::from_table(&historical);
        Self {
            historical,
            forecast,
            countries,
        }
    }
}

/// An sRGB colour, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Observed data is drawn solid, forecasts dashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// Which tables a trend request was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendCase {
    /// Observed data only (forecast off, or the window ends inside history).
    Historical,
    /// Forecast data only (the window starts inside the forecast range).
    ForecastOnly,
    /// Observed data followed by forecast data.
    Spanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One drawable line: a single mode over a single source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSegment {
    pub mode: String,
    pub style: LineStyle,
    pub color: Rgb,
    /// Only the first segment of a mode gets a legend entry.
    pub show_legend: bool,
    pub points: Vec<TrendPoint>,
}

/// Output of the trend assembler for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub country: String,
    pub case: TrendCase,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub segments: Vec<TrendSegment>,
}

impl TrendChart {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }

    /// Legend entries in drawing order: `(mode, colour)`.
    pub fn legend(&self) -> Vec<(&str, Rgb)> {
        self.segments
            .iter()
            .filter(|s| s.show_legend)
            .map(|s| (s.mode.as_str(), s.color))
            .collect()
    }
}

/// Inclusive range of dates a user may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table() -> SeriesTable {
        let mut t = SeriesTable::new(vec![d(2020, 1, 13), d(2020, 1, 14), d(2020, 1, 15)]).unwrap();
        t.insert_series("Chile", "walking", vec![Some(1.0), None, Some(3.0)])
            .unwrap();
        t.insert_series("Chile", "driving", vec![Some(4.0), Some(5.0), Some(6.0)])
            .unwrap();
        t
    }

    #[test]
    fn rejects_unsorted_dates() {
        assert!(SeriesTable::new(vec![d(2020, 1, 14), d(2020, 1, 13)]).is_err());
        assert!(SeriesTable::new(vec![d(2020, 1, 14), d(2020, 1, 14)]).is_err());
    }

    #[test]
    fn rejects_duplicate_and_misaligned_series() {
        let mut t = table();
        assert!(t.insert_series("Chile", "walking", vec![None; 3]).is_err());
        assert!(t.insert_series("Peru", "walking", vec![None; 2]).is_err());
    }

    #[test]
    fn modes_are_lexically_ordered() {
        assert_eq!(table().modes("Chile"), vec!["driving", "walking"]);
        assert!(table().modes("Peru").is_empty());
    }

    #[test]
    fn window_is_inclusive_and_empty_when_inverted() {
        let t = table();
        assert_eq!(t.window(d(2020, 1, 14), d(2020, 1, 15)), 1..3);
        assert_eq!(t.window(d(2019, 1, 1), d(2030, 1, 1)), 0..3);
        assert_eq!(t.window(d(2020, 1, 15), d(2020, 1, 13)), 2..2);
        assert!(t.window(d(2021, 1, 1), d(2021, 2, 1)).is_empty());
    }

    #[test]
    fn cell_lookup() {
        let t = table();
        assert_eq!(t.value("Chile", "walking", d(2020, 1, 15)), Some(3.0));
        assert_eq!(t.value("Chile", "walking", d(2020, 1, 14)), None);
        assert_eq!(t.value("Chile", "walking", d(2020, 2, 1)), None);
        assert_eq!(t.series_count(), 2);
    }

    #[test]
    fn rgb_serializes_as_hex() {
        let json = serde_json::to_string(&Rgb(99, 110, 250)).unwrap();
        assert_eq!(json, "\"#636EFA\"");
    }
}
