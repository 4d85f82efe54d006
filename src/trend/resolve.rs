//! Country selection with a silent fallback.

use tracing::warn;

use crate::domain::CountrySet;
use crate::error::AppError;

/// Outcome of resolving a requested country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub country: String,
    /// User-facing notice when the request was substituted.
    pub notice: Option<String>,
}

/// Return `requested` if it has data, otherwise `default`.
///
/// A substitution is not an error: the notice is logged and returned for
/// display. Only a `default` that is itself missing fails.
pub fn resolve_country(
    requested: &str,
    countries: &CountrySet,
    default: &str,
) -> Result<Resolved, AppError> {
    if countries.contains(requested) {
        return Ok(Resolved {
            country: requested.to_string(),
            notice: None,
        });
    }

    if !countries.contains(default) {
        return Err(AppError::integrity(format!(
            "Default country '{default}' is missing from the loaded data."
        )));
    }

    let notice = format!("No data available for {requested}.");
    warn!(requested, fallback = default, "{notice}");
    Ok(Resolved {
        country: default.to_string(),
        notice: Some(notice),
    })
}
