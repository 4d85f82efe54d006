//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads configuration
//! - initializes logging
//! - runs the fetch job, or loads the tables once and serves one command

use clap::Parser;
use reqwest::blocking::Client;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{BoundsArgs, Command, FetchArgs, KeyPolicy, MapArgs, SourceArgs, TrendArgs};
use crate::config::AppConfig;
use crate::data::{AppleClient, LocalStore, ObjectStore};
use crate::error::AppError;
use crate::trend::TrendRequest;

pub mod pipeline;

/// Entry point for the `mobility` binary.
pub fn run() -> Result<(), AppError> {
    // `mobility` with no arguments opens the dashboard.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let config = AppConfig::from_env();

    // The TUI owns the terminal; stderr logging would draw over it.
    init_logging(!matches!(cli.command, Command::Tui(_)));

    match cli.command {
        Command::Fetch(args) => handle_fetch(args, &config),
        Command::Trend(args) => handle_trend(args, &config),
        Command::Map(args) => handle_map(args, &config),
        Command::Bounds(args) => handle_bounds(args, &config),
        Command::Tui(args) => {
            let dashboard = pipeline::load_dashboard(&with_sources(&config, &args))?;
            crate::tui::run(dashboard)
        }
    }
}

fn init_logging(enabled: bool) {
    let filter = if enabled {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("off")
    };
    // Ignore the error if a subscriber is already installed (tests, embedding).
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fetch(args: FetchArgs, config: &AppConfig) -> Result<(), AppError> {
    let apple = AppleClient::new(Client::new());
    let link = apple.resolve_link()?;
    let bytes = apple.download(&link)?;

    let key = match args.key_policy {
        KeyPolicy::Fixed => args
            .file_name
            .unwrap_or_else(|| config.trend_file_name.clone()),
        KeyPolicy::FromUrl => link.file_name.clone(),
    };
    let store = LocalStore::new(args.bucket.unwrap_or_else(|| config.bucket.clone()));
    store.put(&key, &bytes)?;

    info!(bucket = %store.root().display(), key = %key, "fetch complete");
    println!("Stored {} ({} bytes) as {}/{}", link.url, bytes.len(), store.root().display(), key);
    Ok(())
}

fn handle_trend(args: TrendArgs, config: &AppConfig) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(&with_sources(config, &args.source))?;
    let initial = dashboard.initial_request(args.forecast)?;
    let request = TrendRequest {
        country: args.country.unwrap_or(initial.country),
        include_forecast: args.forecast,
        start: args.start.unwrap_or(initial.start),
        end: args.end.unwrap_or(initial.end),
    };

    let view = dashboard.trend(&request)?;
    print!(
        "{}",
        crate::report::format_trend_summary(&view.chart, view.notice.as_deref())
    );
    if !args.no_plot {
        println!();
        print!(
            "{}",
            crate::plot::render_trend_plot(&view.chart, args.width, args.height)
        );
    }

    if let Some(path) = &args.export {
        crate::io::write_trend_csv_file(path, &view.chart)?;
        info!(path = %path.display(), "wrote trend CSV");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_trend_json_file(path, &view.chart)?;
        info!(path = %path.display(), "wrote trend JSON");
    }
    Ok(())
}

fn handle_map(args: MapArgs, config: &AppConfig) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(&with_sources(config, &args.source))?;
    let summary = dashboard
        .summary()
        .ok_or_else(|| AppError::integrity("Report has no dates to summarize."))?;
    print!("{}", crate::report::format_map_summary(summary, args.top));
    Ok(())
}

fn handle_bounds(args: BoundsArgs, config: &AppConfig) -> Result<(), AppError> {
    let dashboard = pipeline::load_dashboard(&with_sources(config, &args.source))?;
    let bounds = dashboard.bounds(args.forecast)?;
    print!("{}", crate::report::format_bounds(&bounds, args.forecast));
    Ok(())
}

/// Apply `--trends` / `--forecast-source` on top of the environment.
fn with_sources(config: &AppConfig, args: &SourceArgs) -> AppConfig {
    AppConfig {
        trend_source: args
            .trends
            .clone()
            .unwrap_or_else(|| config.trend_source.clone()),
        forecast_source: args
            .forecast_source
            .clone()
            .unwrap_or_else(|| config.forecast_source.clone()),
        ..config.clone()
    }
}

/// Rewrite argv so `mobility` defaults to `mobility tui`.
///
/// Rules:
/// - `mobility`                        -> `mobility tui`
/// - `mobility --trends f.csv ...`     -> `mobility tui --trends f.csv ...`
/// - `mobility --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_dashboard() {
        assert_eq!(rewrite_args(args(&["mobility"])), args(&["mobility", "tui"]));
        assert_eq!(
            rewrite_args(args(&["mobility", "--trends", "a.csv"])),
            args(&["mobility", "tui", "--trends", "a.csv"])
        );
        assert_eq!(rewrite_args(args(&["mobility", "--help"])), args(&["mobility", "--help"]));
        assert_eq!(rewrite_args(args(&["mobility", "map"])), args(&["mobility", "map"]));
    }

    #[test]
    fn source_flags_override_environment() {
        let config = AppConfig::from_lookup(|_| None);
        let merged = with_sources(
            &config,
            &SourceArgs {
                trends: Some("local.csv".to_string()),
                forecast_source: None,
            },
        );
        assert_eq!(merged.trend_source, "local.csv");
        assert_eq!(merged.forecast_source, config.forecast_source);
        assert_eq!(merged.bucket, config.bucket);
    }
}
