//! Read/write projection JSON files.
//!
//! Projection JSON is the "portable" representation of a finished run:
//! - the fitted trend (slope and intercept) with its diagnostics
//! - run metadata (scenario name, epoch, as-of, window, weighting)
//! - the observed cumulative counts and the projected grid
//! - chart options, so a saved run replots exactly
//!
//! The schema is defined by `domain::ProjectionFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitQuality, ProjectionFile, ProjectionGrid, RunConfig, TrendFit};
use crate::error::AppError;

/// Assemble the portable projection record for a finished run.
pub fn build_projection_file(
    config: &RunConfig,
    fit: &TrendFit,
    quality: &FitQuality,
    cumulative: &[u64],
    projected: &[f64],
) -> ProjectionFile {
    let scenario = &config.scenario;
    ProjectionFile {
        tool: "epi".to_string(),
        scenario: scenario.name.clone(),
        epoch_date: scenario.series.epoch_date,
        as_of: config.as_of,
        window: scenario.window,
        weight_mode: scenario.weight_mode,
        trend: *fit,
        quality: quality.clone(),
        observed: cumulative.to_vec(),
        display_from_day: scenario.display_from_day,
        chart: scenario.chart.clone(),
        grid: ProjectionGrid {
            days: (0..projected.len()).collect(),
            projected: projected.to_vec(),
        },
    }
}

/// Write a projection JSON file.
pub fn write_projection_json(path: &Path, projection: &ProjectionFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create projection JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, projection)
        .map_err(|e| AppError::new(2, format!("Failed to write projection JSON: {e}")))?;

    Ok(())
}

/// Read a projection JSON file.
pub fn read_projection_json(path: &Path) -> Result<ProjectionFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open projection JSON '{}': {e}", path.display()),
        )
    })?;
    let projection: ProjectionFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid projection JSON: {e}")))?;
    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::domain::WeightMode;
    use chrono::NaiveDate;

    fn march27_run() -> RunConfig {
        RunConfig {
            scenario: ScenarioConfig::march27().resolve().unwrap(),
            as_of: NaiveDate::from_ymd_opt(2020, 3, 24).unwrap(),
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_curve: None,
        }
    }

    #[test]
    fn projection_file_captures_run_metadata() {
        let config = march27_run();
        let fit = TrendFit {
            slope: 0.2,
            intercept: 1.9,
        };
        let quality = FitQuality {
            sse: 0.01,
            rmse: 0.05,
            n: 4,
        };
        let cumulative = config.scenario.series.cumulative();
        let projected: Vec<f64> = (0..=27).map(|d| fit.value_at(d as f64)).collect();

        let file = build_projection_file(&config, &fit, &quality, &cumulative, &projected);
        assert_eq!(file.tool, "epi");
        assert_eq!(file.scenario, "march27");
        assert_eq!(file.weight_mode, WeightMode::Sqrt);
        assert_eq!(file.observed.len(), 28);
        assert_eq!(file.grid.days.len(), 28);
        assert_eq!(file.grid.days.first(), Some(&0));
        assert_eq!(file.grid.days.last(), Some(&27));
        assert_eq!(file.display_from_day, 16);
    }

    #[test]
    fn projection_json_round_trips() {
        let config = march27_run();
        let fit = TrendFit {
            slope: 0.2075,
            intercept: 1.8581,
        };
        let quality = FitQuality {
            sse: 0.002,
            rmse: 0.02,
            n: 4,
        };
        let cumulative = config.scenario.series.cumulative();
        let projected: Vec<f64> = (0..=27).map(|d| fit.value_at(d as f64)).collect();

        let file = build_projection_file(&config, &fit, &quality, &cumulative, &projected);
        let json = serde_json::to_string_pretty(&file).unwrap();
        let back: ProjectionFile = serde_json::from_str(&json).unwrap();

        assert_eq!(back.scenario, file.scenario);
        assert_eq!(back.epoch_date, file.epoch_date);
        assert_eq!(back.window, file.window);
        assert!((back.trend.slope - file.trend.slope).abs() < 1e-12);
        assert_eq!(back.observed, file.observed);
        assert_eq!(back.grid.projected.len(), file.grid.projected.len());
        assert_eq!(back.chart.marker_days, vec![25]);
        assert_eq!(back.chart.projection_name, "Framreikningur");
    }
}
