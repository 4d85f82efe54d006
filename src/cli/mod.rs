//! Command-line parsing for the mobility dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from loading and trend assembly.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mobility", version, about = "Mobility trends dashboard with forecast overlay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the current published report and store it in the bucket.
    Fetch(FetchArgs),
    /// Assemble one country's trend, print it, and optionally export it.
    Trend(TrendArgs),
    /// Print the per-country map summary (latest average change).
    Map(MapArgs),
    /// Print the selectable date window.
    Bounds(BoundsArgs),
    /// Launch the interactive dashboard.
    Tui(SourceArgs),
}

/// Overrides for where the tables are loaded from.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Raw report URL or path (overrides MOBILITY_TREND_SOURCE).
    #[arg(long, value_name = "URL|PATH")]
    pub trends: Option<String>,

    /// Forecast table URL or path (overrides MOBILITY_FORECAST_SOURCE).
    #[arg(long = "forecast-source", value_name = "URL|PATH")]
    pub forecast_source: Option<String>,
}

/// How the stored object is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyPolicy {
    /// Always the configured file name.
    Fixed,
    /// The file name of the published report URL.
    FromUrl,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Bucket directory (overrides MOBILITY_BUCKET).
    #[arg(long)]
    pub bucket: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = KeyPolicy::Fixed)]
    pub key_policy: KeyPolicy,

    /// Object key for the fixed policy (overrides MOBILITY_TREND_FILE_NAME).
    #[arg(long)]
    pub file_name: Option<String>,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Country to chart; unknown names fall back to the default country.
    #[arg(short = 'c', long)]
    pub country: Option<String>,

    /// Include the forecast overlay.
    #[arg(long)]
    pub forecast: bool,

    /// First date (YYYY-MM-DD); defaults to the first selectable date.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD); defaults to the last selectable date.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Export the assembled points to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the assembled chart (segments, styles, colours) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show only the N most depressed countries.
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct BoundsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Report the window with the forecast range included.
    #[arg(long)]
    pub forecast: bool,
}
