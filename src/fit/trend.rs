//! Exponential trend fitting over a day window.
//!
//! The model is `y = e^intercept * e^(slope * x)`: a straight line in
//! `(day, ln y)` space. Fitting runs (optionally weighted) least squares on
//! the log counts inside an inclusive day window; projection evaluates the
//! fitted line over a day range.
//!
//! All functions are pure: callers pass the series in and get values back,
//! nothing is cached or mutated between calls.

use nalgebra::{DMatrix, DVector};

use crate::domain::{CaseSeries, FitQuality, FitWindow, ProjectionRange, TrendFit, WeightMode};
use crate::error::AppError;
use crate::math::solve_least_squares;

/// Errors from fitting and projecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendError {
    /// A window value is not strictly positive, so its log is undefined.
    NonPositiveCount { day: usize, value: u64 },
    /// The window holds fewer than two points (including inverted windows),
    /// so slope and intercept are underdetermined.
    DegenerateWindow { from_day: usize, to_day: usize },
    /// The window reaches past the end of the series.
    WindowOutOfBounds {
        from_day: usize,
        to_day: usize,
        len: usize,
    },
    /// The projection range is inverted (end before start).
    EmptyRange { start_day: usize, end_day: usize },
    /// The least squares solve failed.
    SolveFailed,
}

impl std::fmt::Display for TrendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendError::NonPositiveCount { day, value } => write!(
                f,
                "cumulative count at day {day} is {value}; the log-linear fit needs strictly positive window values"
            ),
            TrendError::DegenerateWindow { from_day, to_day } => write!(
                f,
                "fit window days {from_day}..={to_day} holds fewer than two points"
            ),
            TrendError::WindowOutOfBounds {
                from_day,
                to_day,
                len,
            } => write!(
                f,
                "fit window days {from_day}..={to_day} exceeds the observed series ({len} days)"
            ),
            TrendError::EmptyRange { start_day, end_day } => write!(
                f,
                "projection range days {start_day}..={end_day} is empty (end before start)"
            ),
            TrendError::SolveFailed => write!(f, "least squares solve failed for the trend fit"),
        }
    }
}

impl std::error::Error for TrendError {}

impl From<TrendError> for AppError {
    fn from(err: TrendError) -> Self {
        let exit_code = match &err {
            // Windows that cannot be fitted are a data problem.
            TrendError::NonPositiveCount { .. } | TrendError::DegenerateWindow { .. } => 3,
            // Bad caller parameters.
            TrendError::WindowOutOfBounds { .. } | TrendError::EmptyRange { .. } => 2,
            TrendError::SolveFailed => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

/// Fit the exponential trend to `cumulative` over `window`.
///
/// Solves least squares of `ln(cumulative[day])` against `day` for each day
/// in the inclusive window, with rows scaled by the chosen weights.
pub fn fit_window(
    cumulative: &[u64],
    window: FitWindow,
    weight_mode: WeightMode,
) -> Result<(TrendFit, FitQuality), TrendError> {
    if window.to_day >= cumulative.len() {
        return Err(TrendError::WindowOutOfBounds {
            from_day: window.from_day,
            to_day: window.to_day,
            len: cumulative.len(),
        });
    }
    if window.len() < 2 {
        return Err(TrendError::DegenerateWindow {
            from_day: window.from_day,
            to_day: window.to_day,
        });
    }

    let n = window.len();
    let mut design = DMatrix::zeros(n, 2);
    let mut rhs = DVector::zeros(n);

    for (row, day) in window.days().enumerate() {
        let count = cumulative[day];
        if count == 0 {
            return Err(TrendError::NonPositiveCount { day, value: count });
        }
        let count = count as f64;
        let weight = match weight_mode {
            WeightMode::Uniform => 1.0,
            WeightMode::Sqrt => count.sqrt(),
        };
        design[(row, 0)] = weight;
        design[(row, 1)] = weight * day as f64;
        rhs[row] = weight * count.ln();
    }

    let beta = solve_least_squares(&design, &rhs).ok_or(TrendError::SolveFailed)?;
    let fit = TrendFit {
        intercept: beta[0],
        slope: beta[1],
    };

    // Diagnostics use unweighted log-space residuals so runs with different
    // weight modes stay comparable.
    let mut sse = 0.0;
    for day in window.days() {
        let residual = (cumulative[day] as f64).ln() - (fit.intercept + fit.slope * day as f64);
        sse += residual * residual;
    }
    let quality = FitQuality {
        sse,
        rmse: (sse / n as f64).sqrt(),
        n,
    };

    Ok((fit, quality))
}

/// Evaluate a fitted trend over an inclusive day range.
///
/// The output has exactly `end_day - start_day + 1` values.
pub fn project(fit: &TrendFit, range: ProjectionRange) -> Result<Vec<f64>, TrendError> {
    if range.end_day < range.start_day {
        return Err(TrendError::EmptyRange {
            start_day: range.start_day,
            end_day: range.end_day,
        });
    }
    Ok((range.start_day..=range.end_day)
        .map(|day| fit.value_at(day as f64))
        .collect())
}

/// Everything computed by [`extrapolate`].
#[derive(Debug, Clone)]
pub struct Extrapolation {
    pub cumulative: Vec<u64>,
    pub fit: TrendFit,
    pub quality: FitQuality,
    /// Projected values for days `0..=end_day`.
    pub projected: Vec<f64>,
}

/// Cumulate, fit, and project in one call.
///
/// The projection always covers `0..=end_day` so markers can index any day up
/// to the horizon; chart code decides where the drawn trace starts.
pub fn extrapolate(
    series: &CaseSeries,
    window: FitWindow,
    end_day: usize,
    weight_mode: WeightMode,
) -> Result<Extrapolation, TrendError> {
    let cumulative = series.cumulative();
    let (fit, quality) = fit_window(&cumulative, window, weight_mode)?;
    let projected = project(&fit, ProjectionRange::new(0, end_day))?;
    Ok(Extrapolation {
        cumulative,
        fit,
        quality,
        projected,
    })
}
