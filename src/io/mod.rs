//! Input/output helpers.
//!
//! - raw report ingest + normalization (`ingest`)
//! - pre-pivoted forecast ingest (`forecast`)
//! - URL / file sources (`source`)
//! - trend exports (CSV/JSON) (`export`)

pub mod export;
pub mod forecast;
pub mod ingest;
pub mod source;

pub use export::*;
pub use forecast::*;
pub use ingest::*;
pub use source::*;
