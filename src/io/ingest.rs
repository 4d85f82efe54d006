//! Raw mobility report ingest and normalization.
//!
//! This module is responsible for turning the publisher's wide CSV (one row per
//! region and transportation mode, one column per date) into a `SeriesTable`
//! of country-level percent change from baseline.
//!
//! Design goals:
//! - **Strict schema**: a missing column or a stray header is fatal (exit code 2)
//! - **Dense output**: blank cells are kept as `None` so every series covers every date
//! - **Separation of concerns**: no charting or range logic here

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::info;

use crate::domain::{SeriesTable, SeriesValues};
use crate::error::AppError;

/// Only rows with this geography tag are retained.
pub const COUNTRY_GEO_TYPE: &str = "country/region";

/// Reported values are percentages of a baseline fixed at this level.
pub const BASELINE: f64 = 100.0;

const COL_GEO_TYPE: &str = "geo_type";
const COL_REGION: &str = "region";
const COL_TRANSPORTATION: &str = "transportation_type";

/// Columns that must be present and are not date columns.
const METADATA_COLUMNS: [&str; 6] = [
    COL_GEO_TYPE,
    COL_REGION,
    "alternative_name",
    "sub-region",
    "country",
    COL_TRANSPORTATION,
];

/// Summary of one ingest run, for logging and the TUI header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub date_columns: usize,
}

/// Parse and normalize a raw report.
pub fn parse_report<R: Read>(reader: R) -> Result<(SeriesTable, IngestStats), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read report headers: {e}")))?
        .clone();

    let layout = ReportLayout::from_headers(&headers)?;
    let dates: Vec<NaiveDate> = layout.date_columns.iter().map(|(d, _)| *d).collect();
    let mut table = SeriesTable::new(dates)?;

    let mut rows_read = 0usize;
    let mut rows_used = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record =
            result.map_err(|e| AppError::input(format!("Report line {line}: {e}")))?;

        if field(&record, layout.geo_type) != COUNTRY_GEO_TYPE {
            continue;
        }

        let country = field(&record, layout.region);
        let mode = field(&record, layout.transportation);
        if country.is_empty() || mode.is_empty() {
            return Err(AppError::input(format!(
                "Report line {line}: country row without region or transportation type."
            )));
        }

        let values = layout
            .date_columns
            .iter()
            .map(|(date, col)| {
                parse_change(field(&record, *col)).map_err(|raw| {
                    AppError::input(format!(
                        "Report line {line}: non-numeric value '{raw}' for {country}/{mode} on {date}."
                    ))
                })
            })
            .collect::<Result<SeriesValues, AppError>>()?;

        table.insert_series(country, mode, values)?;
        rows_used += 1;
    }

    let stats = IngestStats {
        rows_read,
        rows_used,
        date_columns: layout.date_columns.len(),
    };
    info!(
        rows_read = stats.rows_read,
        rows_used = stats.rows_used,
        dates = stats.date_columns,
        "report parsed"
    );

    Ok((table, stats))
}

/// Column positions resolved from the header row.
struct ReportLayout {
    geo_type: usize,
    region: usize,
    transportation: usize,
    /// `(date, column index)`, sorted by date.
    date_columns: Vec<(NaiveDate, usize)>,
}

impl ReportLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self, AppError> {
        let mut header_map: HashMap<String, usize> = HashMap::new();
        let mut date_columns = Vec::new();

        for (idx, raw) in headers.iter().enumerate() {
            let name = normalize_header_name(raw);
            if METADATA_COLUMNS.contains(&name.as_str()) {
                header_map.insert(name, idx);
                continue;
            }
            let date = NaiveDate::parse_from_str(&name, "%Y-%m-%d").map_err(|_| {
                AppError::input(format!(
                    "Unexpected report column '{name}' (expected metadata or YYYY-MM-DD)."
                ))
            })?;
            date_columns.push((date, idx));
        }

        let missing: Vec<&str> = METADATA_COLUMNS
            .iter()
            .copied()
            .filter(|c| !header_map.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::input(format!(
                "Report is missing required column(s): {}.",
                missing.join(", ")
            )));
        }

        date_columns.sort_by_key(|(date, _)| *date);
        if let Some(pair) = date_columns.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(AppError::input(format!(
                "Report has duplicate date column '{}'.",
                pair[0].0
            )));
        }

        Ok(Self {
            geo_type: header_map[COL_GEO_TYPE],
            region: header_map[COL_REGION],
            transportation: header_map[COL_TRANSPORTATION],
            date_columns,
        })
    }
}

fn normalize_header_name(name: &str) -> String {
    // Some exporters prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

/// Parse a percent-of-baseline cell into a change from baseline.
///
/// Blank cells are `Ok(None)`; anything else that is not a finite number is an error.
fn parse_change(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v - BASELINE)),
        _ => Err(raw.to_string()),
    }
}
