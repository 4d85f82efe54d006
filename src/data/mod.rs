//! Upstream data acquisition.
//!
//! - `apple`: resolve and download the published report
//! - `store`: write fetched bytes to an object store key

pub mod apple;
pub mod store;

pub use apple::{AppleClient, ReportLink};
pub use store::{LocalStore, ObjectStore};
