//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the scenario (preset or TOML) with CLI overrides
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::config::ScenarioConfig;
use crate::domain::{RunConfig, WeightMode};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    // We want `epi` and `epi -s march14` to behave like `epi tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Project(args) => handle_fit(args, OutputMode::TableOnly),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    TableOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    // Print terminal output.
    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_run_summary(
                    &config,
                    &run.stats,
                    &run.fit,
                    &run.quality,
                    &run.projected
                )
            );
            let markers = crate::report::format_markers(&run.markers);
            if !markers.is_empty() {
                println!("{markers}");
            }
        }
        OutputMode::TableOnly => {
            println!(
                "{}",
                crate::report::format_projection_table(
                    &config.scenario,
                    &run.cumulative,
                    &run.projected
                )
            );
        }
    }

    if mode == OutputMode::Full && config.plot {
        println!("{}", config.scenario.chart.title);
        let plot = crate::plot::render_ascii_plot(
            &run.cumulative,
            &run.projected,
            &run.markers,
            &config.scenario.chart,
            config.scenario.display_from_day,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &config.scenario, &run.cumulative, &run.projected)?;
    }
    if let Some(path) = &config.export_curve {
        let projection = crate::io::curve::build_projection_file(
            &config,
            &run.fit,
            &run.quality,
            &run.cumulative,
            &run.projected,
        );
        crate::io::curve::write_projection_json(path, &projection)?;
    }

    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let projection = crate::io::curve::read_projection_json(&args.curve)?;

    // Markers are recomputed so T+0 tracks the new as-of date rather than
    // the one the file was saved with.
    let as_of = parse_as_of(args.as_of.as_deref())?;
    let markers = crate::report::compute_markers(
        projection.epoch_date,
        &projection.observed,
        &projection.grid.projected,
        &projection.chart.marker_days,
        &projection.chart.marker_suffix,
        as_of,
    );

    println!("{}", projection.chart.title);
    let plot = crate::plot::render_ascii_plot(
        &projection.observed,
        &projection.grid.projected,
        &markers,
        &projection.chart,
        projection.display_from_day,
        args.width,
        args.height,
    );
    println!("{plot}");

    let markers_text = crate::report::format_markers(&markers);
    if !markers_text.is_empty() {
        println!("{markers_text}");
    }
    Ok(())
}

/// Build the run configuration: scenario (preset or TOML) plus CLI overrides.
pub fn run_config_from_args(args: &FitArgs) -> Result<RunConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => ScenarioConfig::from_toml_file(path)?,
        None => ScenarioConfig::from_preset(&args.scenario)?,
    };

    if let Some(from_day) = args.from_day {
        config.fit.from_day = from_day;
    }
    if let Some(to_day) = args.to_day {
        config.fit.to_day = to_day;
    }
    if let Some(end_day) = args.end_day {
        config.projection.end_day = end_day;
    }
    if let Some(weights) = args.weights {
        config.fit.weighted = matches!(weights, WeightMode::Sqrt);
    }

    let scenario = config.resolve()?;
    let as_of = parse_as_of(args.as_of.as_deref())?;

    Ok(RunConfig {
        scenario,
        as_of,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    })
}

/// Parse an `--as-of` date, defaulting to today.
pub fn parse_as_of(arg: Option<&str>) -> Result<NaiveDate, AppError> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| AppError::new(2, format!("Invalid --as-of date '{s}': {e}"))),
        None => Ok(Local::now().date_naive()),
    }
}

/// Rewrite argv so `epi` defaults to `epi tui`.
///
/// Rules:
/// - `epi`                      -> `epi tui`
/// - `epi -s march14 ...`       -> `epi tui -s march14 ...`
/// - `epi --help/--version/-h`  -> unchanged (show top-level help/version)
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

    let is_subcommand = matches!(arg1.as_str(), "fit" | "project" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
