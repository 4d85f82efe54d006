//! `mobility-trends` library crate.
//!
//! The binary (`mobility`) is a thin wrapper around this library so that:
//!
//! - loading and trend assembly are testable without spawning processes
//! - the CLI and the TUI share one pipeline (`app::pipeline`)

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod trend;
pub mod tui;
