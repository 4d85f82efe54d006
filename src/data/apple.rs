//! Publisher integration for the Apple Mobility Trends report.
//!
//! The report URL changes with every publication, so the current one is read
//! from a small index document before downloading.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;

const HOST: &str = "https://covid19-static.cdn-apple.com";
const INDEX_URL: &str = "https://covid19-static.cdn-apple.com/covid19-mobility-data/current/v3/index.json";
const LOCALE: &str = "en-us";

/// A resolved, downloadable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLink {
    pub url: String,
    /// Last path segment of `url`, e.g. `applemobilitytrends-2020-12-08.csv`.
    pub file_name: String,
}

pub struct AppleClient {
    client: Client,
    index_url: String,
}

impl AppleClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            index_url: INDEX_URL.to_string(),
        }
    }

    /// Resolve today's report link from the index document.
    pub fn resolve_link(&self) -> Result<ReportLink, AppError> {
        let resp = self
            .client
            .get(&self.index_url)
            .send()
            .map_err(|e| AppError::runtime(format!("Index request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::runtime(format!(
                "Index request failed with status {}.",
                resp.status()
            )));
        }

        let index: IndexDocument = resp
            .json()
            .map_err(|e| AppError::runtime(format!("Failed to parse index document: {e}")))?;

        let link = link_from_index(&index)?;
        info!(url = %link.url, "resolved report link");
        Ok(link)
    }

    /// Download the report bytes unchanged.
    pub fn download(&self, link: &ReportLink) -> Result<Vec<u8>, AppError> {
        let resp = self
            .client
            .get(&link.url)
            .send()
            .map_err(|e| AppError::runtime(format!("Report download failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::runtime(format!(
                "Report download failed with status {}.",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| AppError::runtime(format!("Failed to read report body: {e}")))?;
        info!(bytes = bytes.len(), file = %link.file_name, "downloaded report");
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexDocument {
    base_path: String,
    regions: HashMap<String, RegionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionEntry {
    csv_path: String,
}

fn link_from_index(index: &IndexDocument) -> Result<ReportLink, AppError> {
    let region = index.regions.get(LOCALE).ok_or_else(|| {
        AppError::runtime(format!("Index document has no '{LOCALE}' region."))
    })?;
    let url = format!("{HOST}{}{}", index.base_path, region.csv_path);
    let file_name = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::runtime(format!("Report URL '{url}' has no file name.")))?
        .to_string();
    Ok(ReportLink { url, file_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"{
        "version": "3.0",
        "basePath": "/covid19-mobility-data/2022HotfixDev12/v3",
        "mobilityDataVersion": "2022HotfixDev12:2022-04-12",
        "regions": {
            "en-us": {
                "jsonPath": "/en-us/applemobilitytrends.json",
                "localeNamesPath": "/en-us/locale-names.json",
                "csvPath": "/en-us/applemobilitytrends-2022-04-12.csv",
                "initialPath": "/en-us/initial-data.json",
                "shards": []
            }
        }
    }"#;

    #[test]
    fn link_joins_host_base_and_csv_path() {
        let index: IndexDocument = serde_json::from_str(INDEX).unwrap();
        let link = link_from_index(&index).unwrap();
        assert_eq!(
            link.url,
            "https://covid19-static.cdn-apple.com/covid19-mobility-data/2022HotfixDev12/v3/en-us/applemobilitytrends-2022-04-12.csv"
        );
        assert_eq!(link.file_name, "applemobilitytrends-2022-04-12.csv");
    }

    #[test]
    fn missing_locale_is_an_error() {
        let index: IndexDocument =
            serde_json::from_str(r#"{"basePath": "/x", "regions": {}}"#).unwrap();
        assert!(link_from_index(&index).is_err());
    }

    #[test]
    fn trailing_slash_has_no_file_name() {
        let index: IndexDocument = serde_json::from_str(
            r#"{"basePath": "/x", "regions": {"en-us": {"csvPath": "/dir/"}}}"#,
        )
        .unwrap();
        assert!(link_from_index(&index).is_err());
    }
}
