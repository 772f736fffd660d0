//! Reporting utilities: formatted terminal output for runs and projections.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{DayMarker, FitQuality, MarkerSource, RunConfig, Scenario, SeriesStats, TrendFit};

/// Format the full run summary (series stats + fit diagnostics + projection).
pub fn format_run_summary(
    config: &RunConfig,
    stats: &SeriesStats,
    fit: &TrendFit,
    quality: &FitQuality,
    projected: &[f64],
) -> String {
    let scenario = &config.scenario;
    let as_of_day = (config.as_of - scenario.series.epoch_date).num_days();
    let mut out = String::new();

    out.push_str("=== epi - exponential case trend ===\n");
    out.push_str(&format!("Scenario: {}\n", scenario.name));
    out.push_str(&format!("As-of: {} (day {as_of_day})\n", config.as_of));
    out.push_str(&format!(
        "Observed: n={} days | {} to {} | total={}\n",
        stats.n_days, stats.first_date, stats.last_date, stats.total_cases
    ));
    out.push_str(&format!(
        "Peak: {} new cases on day {} ({})\n",
        stats.peak_daily,
        stats.peak_daily_day,
        scenario.series.date_of_day(stats.peak_daily_day)
    ));
    out.push_str(&format!(
        "Window: days [{}, {}] | weights: {}\n",
        scenario.window.from_day,
        scenario.window.to_day,
        scenario.weight_mode.display_name()
    ));

    out.push_str("\nFit:\n");
    out.push_str(&format!(
        "- slope={:.6}/day | intercept={:.6}\n",
        fit.slope, fit.intercept
    ));
    let doubling = match fit.doubling_time_days() {
        Some(days) => format!(" | doubling every {days:.1} days"),
        None => " | not growing".to_string(),
    };
    out.push_str(&format!(
        "- daily growth x{:.4}{doubling}\n",
        fit.daily_growth_factor()
    ));
    out.push_str(&format!(
        "- RMSE(log)={:.4} SSE(log)={:.4} n={}\n",
        quality.rmse, quality.sse, quality.n
    ));

    let end_day = projected.len().saturating_sub(1);
    out.push_str("\nProjection:\n");
    out.push_str(&format!(
        "- horizon: day {end_day} ({})\n",
        scenario.series.date_of_day(end_day)
    ));
    if let Some(v) = projected.last() {
        out.push_str(&format!("- projected cumulative at horizon: {}\n", *v as u64));
    }
    out.push('\n');

    out
}

/// Format the day-by-day table of observed and projected counts.
///
/// Days past the observed series leave the daily and total columns blank.
pub fn format_projection_table(
    scenario: &Scenario,
    cumulative: &[u64],
    projected: &[f64],
) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>4} {:<12} {:>6} {:>8} {:>12}\n",
            "day", "date", "daily", "total", "projected"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<12} {:-<6} {:-<8} {:-<12}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for (day, value) in projected.iter().enumerate() {
        let daily = match scenario.series.daily.get(day) {
            Some(count) => count.to_string(),
            None => String::new(),
        };
        let total = match cumulative.get(day) {
            Some(count) => count.to_string(),
            None => String::new(),
        };
        out.push_str(
            format!(
                "{:>4} {:<12} {:>6} {:>8} {:>12.1}\n",
                day,
                scenario.series.date_of_day(day).to_string(),
                daily,
                total,
                value,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the marker list, one bullet per annotated day.
pub fn format_markers(markers: &[DayMarker]) -> String {
    if markers.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str("Markers:\n");
    for m in markers {
        out.push_str(&format!(
            "- day {:>3} ({}): {} [{}]\n",
            m.day,
            m.date,
            m.label,
            source_tag(m.source)
        ));
    }
    out
}

fn source_tag(source: MarkerSource) -> &'static str {
    match source {
        MarkerSource::Observed => "observed",
        MarkerSource::Projected => "projected",
        MarkerSource::None => "no data yet",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::domain::CaseSeries;
    use chrono::NaiveDate;

    fn march14_config() -> RunConfig {
        let scenario = ScenarioConfig::march14().resolve().unwrap();
        RunConfig {
            scenario,
            as_of: NaiveDate::from_ymd_opt(2020, 3, 13).unwrap(),
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_curve: None,
        }
    }

    #[test]
    fn run_summary_includes_key_fields() {
        let config = march14_config();
        let stats = config.scenario.series.stats().unwrap();
        let fit = TrendFit {
            slope: std::f64::consts::LN_2,
            intercept: 0.0,
        };
        let quality = FitQuality {
            sse: 0.0,
            rmse: 0.0,
            n: 9,
        };
        let projected = vec![1.0; 51];

        let summary = format_run_summary(&config, &stats, &fit, &quality, &projected);
        assert!(summary.contains("Scenario: march14"));
        assert!(summary.contains("As-of: 2020-03-13 (day 14)"));
        assert!(summary.contains("total=138"));
        assert!(summary.contains("Window: days [6, 14] | weights: uniform"));
        assert!(summary.contains("doubling every 1.0 days"));
        assert!(summary.contains("horizon: day 50 (2020-04-18)"));
    }

    #[test]
    fn projection_table_blanks_unobserved_days() {
        let scenario = Scenario {
            series: CaseSeries::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                vec![5, 5, 10],
            ),
            ..ScenarioConfig::march14().resolve().unwrap()
        };
        let cumulative = scenario.series.cumulative();
        let projected = vec![5.0, 10.0, 20.0, 40.0, 80.0];

        let table = format_projection_table(&scenario, &cumulative, &projected);
        let lines: Vec<&str> = table.lines().collect();
        // Header, rule, then one row per projected day.
        assert_eq!(lines.len(), 2 + 5);
        assert!(lines[2].contains("2020-01-01"));

        // Observed rows carry five columns, unobserved rows only three.
        assert_eq!(lines[2].split_whitespace().count(), 5);
        assert_eq!(lines[6].split_whitespace().count(), 3);
        assert!(lines[6].contains("80.0"));
    }

    #[test]
    fn marker_list_formats_one_bullet_per_day() {
        let markers = vec![
            DayMarker {
                day: 15,
                date: NaiveDate::from_ymd_opt(2020, 3, 14).unwrap(),
                offset_days: 1,
                source: MarkerSource::Projected,
                count: Some(159),
                label: "(T+1, 159)".to_string(),
                y: 159.4,
            },
            DayMarker {
                day: 13,
                date: NaiveDate::from_ymd_opt(2020, 3, 12).unwrap(),
                offset_days: -1,
                source: MarkerSource::Observed,
                count: Some(118),
                label: "(T-1, 118)".to_string(),
                y: 116.0,
            },
        ];

        let text = format_markers(&markers);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("(T+1, 159)"));
        assert!(lines[1].contains("[projected]"));
        assert!(lines[2].contains("[observed]"));

        assert!(format_markers(&[]).is_empty());
    }
}
