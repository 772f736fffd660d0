//! Debug bundle writer for inspecting a run's inputs and outputs.
//!
//! The bundle is a timestamped markdown file under `debug/` with the full
//! day-by-day table, so a surprising fit can be audited away from the
//! terminal.

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::{DayMarker, FitQuality, RunConfig, TrendFit};
use crate::error::AppError;

pub fn write_debug_bundle(
    config: &RunConfig,
    fit: &TrendFit,
    quality: &FitQuality,
    cumulative: &[u64],
    projected: &[f64],
    markers: &[DayMarker],
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    fs::create_dir_all(&dir)
        .map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "epi_debug_{}_{}_{ts}.md",
        config.scenario.name,
        config.as_of.format("%Y%m%d")
    ));

    let bundle = render_debug_bundle(config, fit, quality, cumulative, projected, markers);
    fs::write(&path, bundle)
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn render_debug_bundle(
    config: &RunConfig,
    fit: &TrendFit,
    quality: &FitQuality,
    cumulative: &[u64],
    projected: &[f64],
    markers: &[DayMarker],
) -> String {
    let scenario = &config.scenario;
    let mut out = String::new();

    out.push_str("# epi debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- scenario: {}\n", scenario.name));
    out.push_str(&format!("- epoch_date: {}\n", scenario.series.epoch_date));
    out.push_str(&format!("- as_of: {}\n", config.as_of));
    out.push_str(&format!(
        "- window: days [{}, {}], weights: {}\n",
        scenario.window.from_day,
        scenario.window.to_day,
        scenario.weight_mode.display_name()
    ));
    out.push_str(&format!(
        "- projection: end_day={}, display_from_day={}\n",
        scenario.end_day, scenario.display_from_day
    ));
    out.push_str(&format!(
        "- fit: slope={:.6}, intercept={:.6}\n",
        fit.slope, fit.intercept
    ));
    out.push_str(&format!(
        "- quality: rmse_log={:.6}, sse_log={:.6}, n={}\n",
        quality.rmse, quality.sse, quality.n
    ));

    out.push_str("\n## Markers\n");
    out.push_str("| day | date | offset | source | label | y |\n");
    out.push_str("| - | - | - | - | - | - |\n");
    for m in markers {
        out.push_str(&format!(
            "| {} | {} | {:+} | {:?} | {} | {:.3} |\n",
            m.day, m.date, m.offset_days, m.source, m.label, m.y
        ));
    }

    out.push_str("\n## Series\n");
    out.push_str("| day | date | daily | cumulative | projected | log_residual |\n");
    out.push_str("| - | - | - | - | - | - |\n");
    for (day, value) in projected.iter().enumerate() {
        let daily = fmt_opt_count(scenario.series.daily.get(day).map(|&c| u64::from(c)));
        let total = fmt_opt_count(cumulative.get(day).copied());
        // Log-space residual against the fitted line, observed days only.
        let residual = cumulative.get(day).and_then(|&c| {
            (c > 0).then(|| (c as f64).ln() - (fit.intercept + fit.slope * day as f64))
        });
        out.push_str(&format!(
            "| {} | {} | {} | {} | {:.3} | {} |\n",
            day,
            scenario.series.date_of_day(day),
            daily,
            total,
            value,
            fmt_opt(residual)
        ));
    }

    out
}

fn fmt_opt_count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.3}"),
        _ => "-".to_string(),
    }
}
