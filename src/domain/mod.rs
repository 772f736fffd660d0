//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the observed case series and its derived cumulative totals (`CaseSeries`)
//! - fit inputs (`FitWindow`, `WeightMode`) and outputs (`TrendFit`, `FitQuality`)
//! - resolved run configuration (`Scenario`, `RunConfig`)
//! - chart annotations and the saved projection schema (`DayMarker`, `ProjectionFile`)

pub mod types;

pub use types::*;
