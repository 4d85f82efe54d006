//! Shared dashboard logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sources -> parse -> dataset -> (resolve country -> assemble trend)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use reqwest::blocking::Client;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{DateBounds, Dataset, TrendChart};
use crate::error::AppError;
use crate::io::{Source, parse_forecast, parse_report};
use crate::report::{MapSummary, summarize_latest};
use crate::trend::{TrendRequest, assemble, date_bounds, resolve_country};

/// The loaded tables plus the fallback country. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Dashboard {
    data: Dataset,
    default_country: String,
    summary: Option<MapSummary>,
}

/// One assembled trend plus the substitution notice, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendView {
    pub chart: TrendChart,
    pub notice: Option<String>,
}

impl Dashboard {
    /// Fails when the tables cannot serve the default view: no country rows,
    /// or the default country is missing.
    pub fn new(data: Dataset, default_country: impl Into<String>) -> Result<Self, AppError> {
        let default_country = default_country.into();
        if data.historical.is_empty() {
            return Err(AppError::integrity("Report has no country-level data."));
        }
        if !data.countries.contains(&default_country) {
            return Err(AppError::integrity(format!(
                "Default country '{default_country}' is not in the report."
            )));
        }
        let summary = summarize_latest(&data.historical, &data.countries);
        Ok(Self {
            data,
            default_country,
            summary,
        })
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    pub fn summary(&self) -> Option<&MapSummary> {
        self.summary.as_ref()
    }

    pub fn bounds(&self, include_forecast: bool) -> Result<DateBounds, AppError> {
        date_bounds(&self.data.historical, &self.data.forecast, include_forecast)
            .ok_or_else(|| AppError::integrity("Report has no dates."))
    }

    /// Default request for the initial view: default country, whole range.
    pub fn initial_request(&self, include_forecast: bool) -> Result<TrendRequest, AppError> {
        let bounds = self.bounds(include_forecast)?;
        Ok(TrendRequest {
            country: self.default_country.clone(),
            include_forecast,
            start: bounds.min,
            end: bounds.max,
        })
    }

    /// Resolve the requested country and assemble its trend.
    pub fn trend(&self, request: &TrendRequest) -> Result<TrendView, AppError> {
        let resolved =
            resolve_country(&request.country, &self.data.countries, &self.default_country)?;
        let chart = assemble(
            &resolved.country,
            &self.data.historical,
            &self.data.forecast,
            request.include_forecast,
            request.start,
            request.end,
        );
        Ok(TrendView {
            chart,
            notice: resolved.notice,
        })
    }
}

/// Load both tables from their configured sources.
pub fn load_dataset(config: &AppConfig) -> Result<Dataset, AppError> {
    let client = Client::new();

    let trend_source = Source::parse(&config.trend_source);
    let raw = trend_source.read_bytes(&client)?;
    let (historical, stats) = parse_report(raw.as_slice())
        .map_err(|e| AppError::new(e.exit_code(), format!("{trend_source}: {e}")))?;

    let forecast_source = Source::parse(&config.forecast_source);
    let raw = forecast_source.read_bytes(&client)?;
    let forecast = parse_forecast(raw.as_slice())
        .map_err(|e| AppError::new(e.exit_code(), format!("{forecast_source}: {e}")))?;

    let data = Dataset::new(historical, forecast);
    info!(
        countries = data.countries.len(),
        rows = stats.rows_used,
        first = ?data.historical.first_date(),
        last = ?data.historical.last_date(),
        forecast_last = ?data.forecast.last_date(),
        "dataset loaded"
    );
    Ok(data)
}

pub fn load_dashboard(config: &AppConfig) -> Result<Dashboard, AppError> {
    Dashboard::new(load_dataset(config)?, config.default_country.clone())
}
