//! Scenario configuration.
//!
//! A scenario bundles everything one run needs: the observed series, the fit
//! window and weighting, the projection horizon, and chart wording. Two
//! built-in presets reproduce the original March 2020 analyses; TOML files
//! describe custom scenarios, with omitted sections inheriting the `march14`
//! defaults.
//!
//! Validation is collected rather than fail-fast so a bad file reports every
//! problem at once.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::data;
use crate::domain::{CaseSeries, ChartOptions, FitWindow, Scenario, WeightMode};
use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn default_name() -> String {
    "custom".to_string()
}

/// Top-level scenario file layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Scenario name used in reports and exports.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub series: SeriesConfig,

    #[serde(default)]
    pub fit: FitConfig,

    #[serde(default)]
    pub projection: ProjectionConfig,

    #[serde(default)]
    pub chart: ChartConfig,
}

/// `[series]` section: the observed daily counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesConfig {
    /// Date of day 0, `YYYY-MM-DD`.
    pub epoch_date: String,
    /// Daily new confirmed cases, one entry per day from day 0.
    pub daily: Vec<u32>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            epoch_date: data::EPOCH_DATE.to_string(),
            daily: data::MARCH14_DAILY.to_vec(),
        }
    }
}

/// `[fit]` section: which days feed the trend fit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// First day of the fit window (inclusive).
    pub from_day: usize,
    /// Last day of the fit window (inclusive).
    pub to_day: usize,
    /// Weight fit residuals by sqrt(count) instead of uniformly.
    pub weighted: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            from_day: 6,
            to_day: 14,
            weighted: false,
        }
    }
}

/// `[projection]` section: how far to extrapolate and where the drawn trace
/// starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Last day to project (inclusive).
    pub end_day: usize,
    /// First day of the projection trace on charts. The fit itself always
    /// covers days 0..=end_day.
    pub display_from_day: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            end_day: 50,
            display_from_day: 0,
        }
    }
}

/// `[chart]` section: axis, markers, and wording.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    /// Log-scale y axis with a fixed range of 1 to `y_axis_upper`.
    pub log_scale: bool,
    pub y_axis_upper: f64,
    /// Days to annotate with a `(T+offset, count)` label.
    pub marker_days: Vec<usize>,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub observed_name: String,
    pub projection_name: String,
    /// Appended after the count inside marker labels.
    pub marker_suffix: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            log_scale: true,
            y_axis_upper: 100_000.0,
            marker_days: vec![15, 27, 37, 42, 46],
            title: "Confirmed Covid-19 cases in Iceland".to_string(),
            x_label: "Days since first confirmed case".to_string(),
            y_label: "Cases".to_string(),
            observed_name: "Observed".to_string(),
            projection_name: "Projection".to_string(),
            marker_suffix: String::new(),
        }
    }
}

/// A single configuration problem.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"fit.to_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl ScenarioConfig {
    pub const PRESETS: &[&str] = &["march14", "march27"];

    /// The March 14 2020 analysis: 15 observed days, unweighted fit over
    /// days 6..=14, projected out to day 50 on a log axis.
    pub fn march14() -> Self {
        Self {
            name: "march14".to_string(),
            series: SeriesConfig::default(),
            fit: FitConfig::default(),
            projection: ProjectionConfig::default(),
            chart: ChartConfig::default(),
        }
    }

    /// The March 27 2020 analysis: 28 observed days, sqrt(count)-weighted fit
    /// over days 16..=19, projected to day 27 on a linear axis with Icelandic
    /// chart wording.
    pub fn march27() -> Self {
        Self {
            name: "march27".to_string(),
            series: SeriesConfig {
                epoch_date: data::EPOCH_DATE.to_string(),
                daily: data::MARCH27_DAILY.to_vec(),
            },
            fit: FitConfig {
                from_day: 16,
                to_day: 19,
                weighted: true,
            },
            projection: ProjectionConfig {
                end_day: 27,
                display_from_day: 16,
            },
            chart: ChartConfig {
                log_scale: false,
                y_axis_upper: 1_500.0,
                marker_days: vec![25],
                title: "Greind smit Covid-19 á Íslandi".to_string(),
                x_label: "Dagar frá fyrsta staðfesta smiti".to_string(),
                y_label: "Fjöldi".to_string(),
                observed_name: "Staðfest smit".to_string(),
                projection_name: "Framreikningur".to_string(),
                marker_suffix: " greind smit".to_string(),
            },
        }
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "march14" => Ok(Self::march14()),
            "march27" => Ok(Self::march27()),
            _ => Err(ConfigError {
                field: "scenario".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let n_days = self.series.daily.len();
        if n_days == 0 {
            errors.push(ConfigError {
                field: "series.daily".into(),
                message: "must contain at least one day".into(),
            });
        }
        if NaiveDate::parse_from_str(&self.series.epoch_date, DATE_FORMAT).is_err() {
            errors.push(ConfigError {
                field: "series.epoch_date".into(),
                message: format!(
                    "\"{}\" is not a YYYY-MM-DD date",
                    self.series.epoch_date
                ),
            });
        }

        if self.fit.from_day > self.fit.to_day {
            errors.push(ConfigError {
                field: "fit.from_day".into(),
                message: format!(
                    "must not exceed fit.to_day ({} > {})",
                    self.fit.from_day, self.fit.to_day
                ),
            });
        }
        if n_days > 0 && self.fit.to_day >= n_days {
            errors.push(ConfigError {
                field: "fit.to_day".into(),
                message: format!("must be within the observed series ({n_days} days)"),
            });
        }

        if self.projection.end_day < self.fit.to_day {
            errors.push(ConfigError {
                field: "projection.end_day".into(),
                message: format!(
                    "must not precede the end of the fit window (day {})",
                    self.fit.to_day
                ),
            });
        }
        if self.projection.display_from_day > self.projection.end_day {
            errors.push(ConfigError {
                field: "projection.display_from_day".into(),
                message: format!(
                    "must not exceed projection.end_day ({})",
                    self.projection.end_day
                ),
            });
        }

        for &day in &self.chart.marker_days {
            if day > self.projection.end_day {
                errors.push(ConfigError {
                    field: "chart.marker_days".into(),
                    message: format!(
                        "day {day} exceeds projection.end_day ({})",
                        self.projection.end_day
                    ),
                });
            }
        }
        if !self.chart.y_axis_upper.is_finite() || self.chart.y_axis_upper <= 0.0 {
            errors.push(ConfigError {
                field: "chart.y_axis_upper".into(),
                message: "must be a positive number".into(),
            });
        } else if self.chart.log_scale && self.chart.y_axis_upper <= 1.0 {
            errors.push(ConfigError {
                field: "chart.y_axis_upper".into(),
                message: "must be > 1 when chart.log_scale is enabled".into(),
            });
        }

        errors
    }

    /// Validates the configuration and builds the typed [`Scenario`] the
    /// pipeline runs on.
    pub fn resolve(&self) -> Result<Scenario, AppError> {
        let errors = self.validate();
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::new(2, joined));
        }

        let epoch_date = NaiveDate::parse_from_str(&self.series.epoch_date, DATE_FORMAT)
            .map_err(|e| {
                AppError::new(
                    2,
                    format!("Invalid series.epoch_date \"{}\": {e}", self.series.epoch_date),
                )
            })?;

        Ok(Scenario {
            name: self.name.clone(),
            series: CaseSeries::new(epoch_date, self.series.daily.clone()),
            window: FitWindow::new(self.fit.from_day, self.fit.to_day),
            weight_mode: WeightMode::from_weighted_flag(self.fit.weighted),
            end_day: self.projection.end_day,
            display_from_day: self.projection.display_from_day,
            chart: ChartOptions {
                log_scale: self.chart.log_scale,
                y_axis_upper: self.chart.y_axis_upper,
                marker_days: self.chart.marker_days.clone(),
                title: self.chart.title.clone(),
                x_label: self.chart.x_label.clone(),
                y_label: self.chart.y_label.clone(),
                observed_name: self.chart.observed_name.clone(),
                projection_name: self.chart.projection_name.clone(),
                marker_suffix: self.chart.marker_suffix.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_cleanly() {
        for name in ScenarioConfig::PRESETS {
            let config = ScenarioConfig::from_preset(name).unwrap();
            let errors = config.validate();
            assert!(errors.is_empty(), "{name}: {errors:?}");
            config.resolve().unwrap();
        }
    }

    #[test]
    fn march27_preset_matches_original_parameters() {
        let scenario = ScenarioConfig::from_preset("march27").unwrap().resolve().unwrap();
        assert_eq!(scenario.window, FitWindow::new(16, 19));
        assert_eq!(scenario.weight_mode, WeightMode::Sqrt);
        assert_eq!(scenario.end_day, 27);
        assert_eq!(scenario.display_from_day, 16);
        assert_eq!(scenario.series.len(), 28);
        assert!(!scenario.chart.log_scale);
        assert_eq!(scenario.chart.marker_days, vec![25]);
        assert_eq!(scenario.chart.marker_suffix, " greind smit");
        assert_eq!(
            scenario.series.date_of_day(0),
            NaiveDate::from_ymd_opt(2020, 2, 28).unwrap()
        );
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let err = ScenarioConfig::from_preset("april1").unwrap_err();
        assert_eq!(err.field, "scenario");
        assert!(err.message.contains("march14"));
        assert!(err.message.contains("march27"));
    }

    #[test]
    fn partial_toml_inherits_march14_defaults() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [fit]
            from_day = 2
            to_day = 9
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "custom");
        assert_eq!(config.fit.from_day, 2);
        assert_eq!(config.fit.to_day, 9);
        assert!(!config.fit.weighted);
        assert_eq!(config.series.daily, data::MARCH14_DAILY.to_vec());
        assert_eq!(config.projection.end_day, 50);
        assert!(config.chart.log_scale);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ScenarioConfig::from_toml_str(
            r#"
            [fit]
            from = 2
            "#,
        )
        .unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut config = ScenarioConfig::march14();
        config.series.epoch_date = "soon".to_string();
        config.fit.from_day = 9;
        config.fit.to_day = 3;
        config.projection.end_day = 2;
        config.projection.display_from_day = 10;
        config.chart.marker_days = vec![40];

        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"series.epoch_date".to_string()));
        assert!(fields.contains(&"fit.from_day".to_string()));
        assert!(fields.contains(&"projection.end_day".to_string()));
        assert!(fields.contains(&"projection.display_from_day".to_string()));
        assert!(fields.contains(&"chart.marker_days".to_string()));
    }

    #[test]
    fn validate_checks_window_against_series_length() {
        let mut config = ScenarioConfig::march14();
        config.fit.to_day = 15;
        config.projection.end_day = 50;

        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fit.to_day");
    }

    #[test]
    fn validate_checks_log_axis_range() {
        let mut config = ScenarioConfig::march14();
        config.chart.y_axis_upper = 1.0;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "chart.y_axis_upper");

        config.chart.log_scale = false;
        assert!(config.validate().is_empty());

        config.chart.y_axis_upper = f64::NAN;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "chart.y_axis_upper");
    }

    #[test]
    fn resolve_rejects_invalid_config_with_joined_message() {
        let mut config = ScenarioConfig::march14();
        config.fit.from_day = 9;
        config.fit.to_day = 3;
        config.projection.display_from_day = 60;

        let err = config.resolve().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("fit.from_day"));
        assert!(err.to_string().contains("projection.display_from_day"));
    }
}
