//! Country resolution and trend assembly.
//!
//! Everything here is pure in-memory work over the read-only tables, so front
//! ends can call it on every input change.

pub mod assemble;
pub mod palette;
pub mod resolve;

use chrono::NaiveDate;

pub use assemble::{assemble, date_bounds, select_case};
pub use palette::{mode_color, scale_color};
pub use resolve::{Resolved, resolve_country};

/// The four inputs a front end tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendRequest {
    pub country: String,
    pub include_forecast: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
}
