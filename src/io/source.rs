//! Data source locations: remote object URLs or local files.

use std::fmt;
use std::path::PathBuf;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::AppError;

/// Where a CSV is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// `http://` and `https://` locations are URLs, everything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }

    /// Read the whole source into memory.
    pub fn read_bytes(&self, client: &Client) -> Result<Vec<u8>, AppError> {
        let bytes = match self {
            Source::Url(url) => {
                info!(%url, "downloading");
                let resp = client
                    .get(url)
                    .send()
                    .map_err(|e| AppError::runtime(format!("Request for '{url}' failed: {e}")))?;
                if !resp.status().is_success() {
                    return Err(AppError::runtime(format!(
                        "Request for '{url}' failed with status {}.",
                        resp.status()
                    )));
                }
                resp.bytes()
                    .map_err(|e| AppError::runtime(format!("Failed to read body of '{url}': {e}")))?
                    .to_vec()
            }
            Source::File(path) => std::fs::read(path).map_err(|e| {
                AppError::input(format!("Failed to read '{}': {e}", path.display()))
            })?,
        };
        debug!(source = %self, bytes = bytes.len(), "source read");
        Ok(bytes)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}
