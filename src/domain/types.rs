//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How window observations are weighted in the log-linear fit objective:
///
/// ```text
/// minimize Σ (w_i (ln y_i - (slope * x_i + intercept)))^2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeightMode {
    /// `w_i = 1`: plain least squares on log counts.
    Uniform,
    /// `w_i = sqrt(y_i)`: larger cumulative counts get more influence, which
    /// counteracts the log transform's tendency to over-weight small early
    /// values.
    Sqrt,
}

impl WeightMode {
    /// Map the `weighted` scenario flag onto a mode.
    pub fn from_weighted_flag(weighted: bool) -> Self {
        if weighted {
            WeightMode::Sqrt
        } else {
            WeightMode::Uniform
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            WeightMode::Uniform => "uniform",
            WeightMode::Sqrt => "sqrt(count)",
        }
    }
}

/// Inclusive day window the trend is fitted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitWindow {
    pub from_day: usize,
    pub to_day: usize,
}

impl FitWindow {
    pub fn new(from_day: usize, to_day: usize) -> Self {
        Self { from_day, to_day }
    }

    /// Number of days in the window (0 when inverted).
    pub fn len(&self) -> usize {
        if self.from_day > self.to_day {
            0
        } else {
            self.to_day - self.from_day + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the window days in order.
    pub fn days(&self) -> std::ops::RangeInclusive<usize> {
        self.from_day..=self.to_day
    }
}

/// Inclusive day range a fitted trend is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRange {
    pub start_day: usize,
    pub end_day: usize,
}

impl ProjectionRange {
    pub fn new(start_day: usize, end_day: usize) -> Self {
        Self { start_day, end_day }
    }
}

/// Fitted exponential trend: `y = e^intercept * e^(slope * x)`.
///
/// `slope` and `intercept` are the line coefficients in `(day, ln y)` space,
/// so `slope` is the continuously compounded daily growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendFit {
    /// Evaluate the fitted curve at day `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        (self.intercept + self.slope * x).exp()
    }

    /// Multiplicative growth per day, `e^slope`.
    pub fn daily_growth_factor(&self) -> f64 {
        self.slope.exp()
    }

    /// Days for the cumulative count to double; `None` when not growing.
    pub fn doubling_time_days(&self) -> Option<f64> {
        if self.slope > 0.0 {
            Some(std::f64::consts::LN_2 / self.slope)
        } else {
            None
        }
    }
}

/// Fit quality diagnostics (log-space residuals over the window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Observed daily confirmed-case series.
///
/// Day 0 is the date of the first confirmed case (`epoch_date`); `daily`
/// holds the per-day increments. Cumulative totals are derived on demand and
/// never stored, so the two cannot drift apart.
#[derive(Debug, Clone)]
pub struct CaseSeries {
    pub epoch_date: NaiveDate,
    pub daily: Vec<u32>,
}

impl CaseSeries {
    pub fn new(epoch_date: NaiveDate, daily: Vec<u32>) -> Self {
        Self { epoch_date, daily }
    }

    /// Inclusive running totals: `cumulative[i] = daily[0] + ... + daily[i]`.
    pub fn cumulative(&self) -> Vec<u64> {
        let mut total = 0u64;
        self.daily
            .iter()
            .map(|&count| {
                total += u64::from(count);
                total
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.daily.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// Calendar date of day `day` (day 0 = `epoch_date`).
    pub fn date_of_day(&self, day: usize) -> NaiveDate {
        self.epoch_date + Days::new(day as u64)
    }

    /// Summarize the observed data; `None` for an empty series.
    pub fn stats(&self) -> Option<SeriesStats> {
        if self.daily.is_empty() {
            return None;
        }
        let n_days = self.daily.len();
        let total_cases: u64 = self.daily.iter().map(|&d| u64::from(d)).sum();
        let (peak_daily_day, &peak_daily) = self
            .daily
            .iter()
            .enumerate()
            .max_by_key(|&(_, &count)| count)?;
        Some(SeriesStats {
            n_days,
            total_cases,
            peak_daily,
            peak_daily_day,
            first_date: self.epoch_date,
            last_date: self.date_of_day(n_days - 1),
        })
    }
}

/// Summary of the observed series (for reports and the TUI header).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesStats {
    pub n_days: usize,
    pub total_cases: u64,
    pub peak_daily: u32,
    pub peak_daily_day: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Chart presentation settings carried by a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Log10 y axis with a fixed `[1, y_axis_upper]` range; linear axes are
    /// data-driven instead.
    pub log_scale: bool,
    pub y_axis_upper: f64,
    /// Days annotated with `(T±N, count)` markers.
    pub marker_days: Vec<usize>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub observed_name: String,
    pub projection_name: String,
    /// Text appended after the count in marker labels (e.g. ` greind smit`).
    pub marker_suffix: String,
}

/// A fully resolved scenario: validated config with dates parsed.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub series: CaseSeries,
    pub window: FitWindow,
    pub weight_mode: WeightMode,
    /// Last projected day (the projection always starts at day 0).
    pub end_day: usize,
    /// First day of the projection trace on charts. Fitting and markers use
    /// the full projection regardless.
    pub display_from_day: usize,
    pub chart: ChartOptions,
}

/// Where a marker's displayed count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSource {
    Observed,
    Projected,
    /// Marker day is today but past the observed data; rendered bare.
    None,
}

/// A `(T±N, count)` chart annotation for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayMarker {
    pub day: usize,
    pub date: NaiveDate,
    /// Whole days relative to the as-of date (negative = past).
    pub offset_days: i64,
    pub source: MarkerSource,
    /// Count shown in the label, truncated to an integer.
    pub count: Option<u64>,
    pub label: String,
    /// Chart y position: the projected value at this day, even for past days.
    pub y: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from a scenario (preset or TOML) plus CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scenario: Scenario,
    /// Date that `T+0` refers to in marker labels.
    pub as_of: NaiveDate,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

/// A saved projection file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionFile {
    pub tool: String,
    pub scenario: String,
    pub epoch_date: NaiveDate,
    pub as_of: NaiveDate,
    pub window: FitWindow,
    pub weight_mode: WeightMode,
    pub trend: TrendFit,
    pub quality: FitQuality,
    /// Observed cumulative counts, day 0 onward.
    pub observed: Vec<u64>,
    pub display_from_day: usize,
    pub chart: ChartOptions,
    pub grid: ProjectionGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionGrid {
    pub days: Vec<usize>,
    pub projected: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cumulative_is_inclusive_running_total() {
        let series = CaseSeries::new(date(2020, 2, 28), vec![1, 2, 3]);
        assert_eq!(series.cumulative(), vec![1, 3, 6]);

        let with_zeros = CaseSeries::new(date(2020, 2, 28), vec![0, 0, 5]);
        assert_eq!(with_zeros.cumulative(), vec![0, 0, 5]);

        let empty = CaseSeries::new(date(2020, 2, 28), vec![]);
        assert!(empty.cumulative().is_empty());
    }

    #[test]
    fn date_of_day_counts_from_epoch() {
        let series = CaseSeries::new(date(2020, 2, 28), vec![1; 30]);
        assert_eq!(series.date_of_day(0), date(2020, 2, 28));
        // 2020 is a leap year.
        assert_eq!(series.date_of_day(1), date(2020, 2, 29));
        assert_eq!(series.date_of_day(25), date(2020, 3, 24));
    }

    #[test]
    fn stats_finds_peak_day() {
        let series = CaseSeries::new(date(2020, 2, 28), vec![1, 5, 2, 5, 3]);
        let stats = series.stats().unwrap();
        assert_eq!(stats.n_days, 5);
        assert_eq!(stats.total_cases, 16);
        assert_eq!(stats.peak_daily, 5);
        // Ties resolve to the later day via max_by_key.
        assert_eq!(stats.peak_daily_day, 3);
        assert_eq!(stats.last_date, date(2020, 3, 3));

        let empty = CaseSeries::new(date(2020, 2, 28), vec![]);
        assert!(empty.stats().is_none());
    }

    #[test]
    fn window_len_handles_inverted_windows() {
        assert_eq!(FitWindow::new(6, 14).len(), 9);
        assert_eq!(FitWindow::new(3, 3).len(), 1);
        assert_eq!(FitWindow::new(5, 3).len(), 0);
        assert!(FitWindow::new(5, 3).is_empty());
    }

    #[test]
    fn trend_fit_growth_accessors() {
        let fit = TrendFit {
            slope: std::f64::consts::LN_2,
            intercept: 0.0,
        };
        assert!((fit.daily_growth_factor() - 2.0).abs() < 1e-12);
        assert!((fit.doubling_time_days().unwrap() - 1.0).abs() < 1e-12);
        assert!((fit.value_at(3.0) - 8.0).abs() < 1e-9);

        let shrinking = TrendFit {
            slope: -0.1,
            intercept: 0.0,
        };
        assert!(shrinking.doubling_time_days().is_none());
    }
}
