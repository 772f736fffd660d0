//! Shared "run pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cumulate -> fit window -> project -> markers
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{DayMarker, FitQuality, RunConfig, SeriesStats, TrendFit};
use crate::error::AppError;
use crate::fit::extrapolate;
use crate::report::compute_markers;

/// All computed outputs of a single `epi fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stats: SeriesStats,
    /// Observed cumulative counts, one per observed day.
    pub cumulative: Vec<u64>,
    pub fit: TrendFit,
    pub quality: FitQuality,
    /// Projected values for days `0..=end_day`.
    pub projected: Vec<f64>,
    pub markers: Vec<DayMarker>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, AppError> {
    let scenario = &config.scenario;

    let stats = scenario
        .series
        .stats()
        .ok_or_else(|| AppError::new(3, "Scenario has no observed days."))?;

    let run = extrapolate(
        &scenario.series,
        scenario.window,
        scenario.end_day,
        scenario.weight_mode,
    )?;

    let markers = compute_markers(
        scenario.series.epoch_date,
        &run.cumulative,
        &run.projected,
        &scenario.chart.marker_days,
        &scenario.chart.marker_suffix,
        config.as_of,
    );

    Ok(RunOutput {
        stats,
        cumulative: run.cumulative,
        fit: run.fit,
        quality: run.quality,
        projected: run.projected,
        markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::domain::{CaseSeries, MarkerSource, RunConfig};
    use chrono::NaiveDate;

    fn run_config(preset: &str, as_of: NaiveDate) -> RunConfig {
        RunConfig {
            scenario: ScenarioConfig::from_preset(preset).unwrap().resolve().unwrap(),
            as_of,
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_curve: None,
        }
    }

    #[test]
    fn march14_run_end_to_end() {
        // The original March 14 analysis, rendered on March 13.
        let config = run_config("march14", NaiveDate::from_ymd_opt(2020, 3, 13).unwrap());
        let run = run_fit(&config).unwrap();

        assert_eq!(run.stats.n_days, 15);
        assert_eq!(run.stats.total_cases, 138);
        assert_eq!(run.cumulative[13], 118);
        assert_eq!(run.projected.len(), 51);

        // All five marker days lie after the as-of date, so every count comes
        // from the projection.
        assert_eq!(run.markers.len(), 5);
        for m in &run.markers {
            assert_eq!(m.source, MarkerSource::Projected);
            assert!(m.offset_days > 0);
            assert_eq!(m.label, format!("(T{:+}, {})", m.offset_days, m.count.unwrap()));
        }
        assert_eq!(run.markers[0].day, 15);
        assert_eq!(run.markers[0].offset_days, 1);
        assert!((run.projected[15] - 159.0).abs() < 5.0);
    }

    #[test]
    fn march27_weighted_run_end_to_end() {
        // Rendered on March 24, which is day 25: the single marker day.
        let config = run_config("march27", NaiveDate::from_ymd_opt(2020, 3, 24).unwrap());
        let run = run_fit(&config).unwrap();

        assert_eq!(run.projected.len(), 28);
        assert!(run.projected[27] > 1_300.0 && run.projected[27] < 2_200.0);

        assert_eq!(run.markers.len(), 1);
        let m = &run.markers[0];
        assert_eq!(m.day, 25);
        assert_eq!(m.offset_days, 0);
        assert_eq!(m.source, MarkerSource::Observed);
        assert_eq!(m.label, "(T+0, 762 greind smit)");
    }

    #[test]
    fn empty_series_is_reported_as_data_error() {
        let mut config = run_config("march14", NaiveDate::from_ymd_opt(2020, 3, 13).unwrap());
        config.scenario.series =
            CaseSeries::new(NaiveDate::from_ymd_opt(2020, 2, 28).unwrap(), vec![]);

        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("no observed days"));
    }
}
