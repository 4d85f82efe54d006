//! Forecast table ingest.
//!
//! The forecast file is already pivoted: two header rows name the country and
//! transportation mode of each column, and the first column holds the date.
//! Values are loaded verbatim (they are already changes from baseline).

use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::info;

use crate::domain::{SeriesTable, SeriesValues};
use crate::error::AppError;

/// Parse a two-row-header forecast CSV.
pub fn parse_forecast<R: Read>(reader: R) -> Result<SeriesTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = reader.records();
    let mut next_header = |what: &str| -> Result<StringRecord, AppError> {
        match records.next() {
            Some(Ok(r)) => Ok(r),
            Some(Err(e)) => Err(AppError::input(format!("Failed to read forecast {what} row: {e}"))),
            None => Err(AppError::input(format!("Forecast file has no {what} row."))),
        }
    };
    let countries = next_header("country header")?;
    let modes = next_header("transportation header")?;

    if countries.len() != modes.len() {
        return Err(AppError::input(
            "Forecast header rows have different column counts.",
        ));
    }
    if countries.len() < 2 {
        return Err(AppError::input("Forecast file has no series columns."));
    }

    let keys: Vec<(String, String)> = countries
        .iter()
        .zip(modes.iter())
        .skip(1)
        .enumerate()
        .map(|(idx, (c, m))| {
            if c.is_empty() || m.is_empty() {
                Err(AppError::input(format!(
                    "Forecast column {} has no country or transportation type.",
                    idx + 2
                )))
            } else {
                Ok((c.to_string(), m.to_string()))
            }
        })
        .collect::<Result<_, _>>()?;

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut columns: Vec<SeriesValues> = vec![Vec::new(); keys.len()];

    for (idx, result) in records.enumerate() {
        // Two header rows precede the data.
        let line = idx + 3;
        let record =
            result.map_err(|e| AppError::input(format!("Forecast line {line}: {e}")))?;
        let index_cell = record.get(0).unwrap_or("");

        let Some(date) = parse_index_date(index_cell) else {
            // pandas writes an index-name row under multi-level headers.
            if record.iter().skip(1).all(str::is_empty) {
                continue;
            }
            return Err(AppError::input(format!(
                "Forecast line {line}: invalid date '{index_cell}'."
            )));
        };
        dates.push(date);

        for (col, values) in columns.iter_mut().enumerate() {
            let raw = record.get(col + 1).unwrap_or("");
            let value = if raw.is_empty() {
                None
            } else {
                match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => Some(v),
                    _ => {
                        return Err(AppError::input(format!(
                            "Forecast line {line}: non-numeric value '{raw}'."
                        )));
                    }
                }
            };
            values.push(value);
        }
    }

    let mut table = SeriesTable::new(dates)?;
    for ((country, mode), values) in keys.iter().zip(columns) {
        table.insert_series(country, mode, values)?;
    }

    info!(
        dates = table.dates().len(),
        series = table.series_count(),
        "forecast parsed"
    );
    Ok(table)
}

/// Canonical `YYYY-MM-DD` from an index cell, dropping any time component.
fn parse_index_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const FORECAST: &str = "\
country,Albania,Albania,United States
transportation_type,driving,walking,driving
,,,
2021-02-03,-10.5,3.25,-20
2021-02-04 00:00:00,-11,,-21
";

    #[test]
    fn parses_two_row_header() {
        let table = parse_forecast(FORECAST.as_bytes()).unwrap();
        assert_eq!(table.dates(), &[d(2021, 2, 3), d(2021, 2, 4)]);
        assert_eq!(table.modes("Albania"), vec!["driving", "walking"]);
        assert_eq!(table.value("Albania", "walking", d(2021, 2, 3)), Some(3.25));
        assert_eq!(table.value("Albania", "walking", d(2021, 2, 4)), None);
        assert_eq!(table.value("United States", "driving", d(2021, 2, 4)), Some(-21.0));
    }

    #[test]
    fn timestamps_are_truncated_to_days() {
        assert_eq!(parse_index_date("2021-02-04 00:00:00"), Some(d(2021, 2, 4)));
        assert_eq!(parse_index_date("2021-02-04"), Some(d(2021, 2, 4)));
        assert_eq!(parse_index_date("date"), None);
        assert_eq!(parse_index_date(""), None);
    }

    #[test]
    fn garbage_index_with_values_is_fatal() {
        let csv = "\
country,Albania
transportation_type,driving
yesterday,1.0
";
        assert!(parse_forecast(csv.as_bytes()).is_err());
    }

    #[test]
    fn missing_header_rows_are_fatal() {
        assert!(parse_forecast("country,Albania\n".as_bytes()).is_err());
        assert!(parse_forecast("".as_bytes()).is_err());
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let csv = "country,Albania\ntransportation_type,driving\n";
        let table = parse_forecast(csv.as_bytes()).unwrap();
        assert!(table.dates().is_empty());
        assert!(table.is_empty());
    }
}
