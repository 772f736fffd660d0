//! Command-line parsing for the exponential case-trend fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::WeightMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "epi",
    version,
    about = "Exponential case-trend fitter for Covid-19 Iceland counts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the trend, print the summary and markers, and optionally plot/export.
    Fit(FitArgs),
    /// Print the day-by-day projection table only (useful for scripting).
    Project(FitArgs),
    /// Plot a previously exported projection JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `epi fit`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Common options for fitting and projecting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Scenario preset to run (march14, march27).
    #[arg(short = 's', long, default_value = "march27")]
    pub scenario: String,

    /// Scenario TOML file (takes precedence over --scenario).
    #[arg(short = 'c', long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// First day of the fit window (inclusive).
    #[arg(long)]
    pub from_day: Option<usize>,

    /// Last day of the fit window (inclusive).
    #[arg(long)]
    pub to_day: Option<usize>,

    /// Last day to project (inclusive).
    #[arg(long)]
    pub end_day: Option<usize>,

    /// Fit weighting: uniform, or sqrt of each count.
    #[arg(long, value_enum)]
    pub weights: Option<WeightMode>,

    /// Date that marker offsets count from (YYYY-MM-DD, default: today).
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export day-by-day results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted trend + projection grid to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for plotting a saved projection.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Projection JSON file produced by `epi fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Date that marker offsets count from (YYYY-MM-DD, default: today).
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
