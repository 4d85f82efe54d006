//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - the normalized date × (country, mode) table (`SeriesTable`)
//! - the country set and the loaded `Dataset`
//! - trend assembler outputs (`TrendChart`, `TrendSegment`, `LineStyle`, ...)

pub mod types;

pub use types::*;
