//! Trend fitting orchestration.
//!
//! Responsibilities:
//!
//! - solve the log-linear least squares problem over a day window
//! - evaluate a fitted trend over a projection range
//! - chain cumulate, fit, and project into one extrapolation call

pub mod trend;

pub use trend::*;
