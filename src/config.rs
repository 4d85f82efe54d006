//! Runtime configuration from `.env` and the environment.
//!
//! CLI flags override these values; see `cli`.

use std::path::PathBuf;

use crate::domain::DEFAULT_COUNTRY;

pub const ENV_TREND_SOURCE: &str = "MOBILITY_TREND_SOURCE";
pub const ENV_FORECAST_SOURCE: &str = "MOBILITY_FORECAST_SOURCE";
pub const ENV_BUCKET: &str = "MOBILITY_BUCKET";
pub const ENV_TREND_FILE_NAME: &str = "MOBILITY_TREND_FILE_NAME";
pub const ENV_DEFAULT_COUNTRY: &str = "MOBILITY_DEFAULT_COUNTRY";

const DEFAULT_TREND_SOURCE: &str =
    "https://storage.googleapis.com/applemobilitydata/applemobilitytrends.csv";
const DEFAULT_FORECAST_SOURCE: &str =
    "https://storage.googleapis.com/applemobilitydata/forecasted_trends.csv";
const DEFAULT_BUCKET: &str = "bucket";
const DEFAULT_TREND_FILE_NAME: &str = "applemobilitytrends.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// URL or path of the raw report.
    pub trend_source: String,
    /// URL or path of the forecast table.
    pub forecast_source: String,
    /// Directory used as the object store bucket by `fetch`.
    pub bucket: PathBuf,
    /// Object key used by `fetch` with the fixed key policy.
    pub trend_file_name: String,
    /// Country shown when a request has no data.
    pub default_country: String,
}

impl AppConfig {
    /// Load `.env` (if present), then read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            trend_source: get(ENV_TREND_SOURCE, DEFAULT_TREND_SOURCE),
            forecast_source: get(ENV_FORECAST_SOURCE, DEFAULT_FORECAST_SOURCE),
            bucket: PathBuf::from(get(ENV_BUCKET, DEFAULT_BUCKET)),
            trend_file_name: get(ENV_TREND_FILE_NAME, DEFAULT_TREND_FILE_NAME),
            default_country: get(ENV_DEFAULT_COUNTRY, DEFAULT_COUNTRY),
        }
    }
}
