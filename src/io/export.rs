//! Export day-by-day results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per projected day, with observed columns left empty once
//! the series runs out.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::Scenario;
use crate::error::AppError;

const HEADER: &str = "day,date,daily,cumulative,projected";

/// Write per-day results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    scenario: &Scenario,
    cumulative: &[u64],
    projected: &[f64],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    write_results(BufWriter::new(file), scenario, cumulative, projected)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

/// Write per-day results as CSV to any writer.
pub fn write_results(
    writer: impl Write,
    scenario: &Scenario,
    cumulative: &[u64],
    projected: &[f64],
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for (day, value) in projected.iter().enumerate() {
        let daily = scenario
            .series
            .daily
            .get(day)
            .map(|c| c.to_string())
            .unwrap_or_default();
        let total = cumulative
            .get(day)
            .map(|c| c.to_string())
            .unwrap_or_default();
        wtr.write_record(&[
            day.to_string(),
            scenario.series.date_of_day(day).to_string(),
            daily,
            total,
            format!("{value:.4}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::domain::CaseSeries;
    use chrono::NaiveDate;

    fn small_scenario() -> Scenario {
        Scenario {
            series: CaseSeries::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                vec![1, 2, 3],
            ),
            ..ScenarioConfig::march14().resolve().unwrap()
        }
    }

    #[test]
    fn header_and_row_count() {
        let scenario = small_scenario();
        let cumulative = scenario.series.cumulative();
        let projected = vec![1.0, 2.0, 4.0, 8.0, 16.0];

        let mut buf = Vec::new();
        write_results(&mut buf, &scenario, &cumulative, &projected).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], HEADER);
        // 1 header + one row per projected day.
        assert_eq!(lines.len(), 1 + 5);
    }

    #[test]
    fn unobserved_days_have_empty_columns() {
        let scenario = small_scenario();
        let cumulative = scenario.series.cumulative();
        let projected = vec![1.0, 2.0, 4.0, 8.0, 16.0];

        let mut buf = Vec::new();
        write_results(&mut buf, &scenario, &cumulative, &projected).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 5);

        // Observed day.
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][1], "2020-01-01");
        assert_eq!(&rows[0][2], "1");
        assert_eq!(&rows[0][3], "1");

        // Past the observed series.
        assert_eq!(&rows[4][0], "4");
        assert_eq!(&rows[4][2], "");
        assert_eq!(&rows[4][3], "");
        let projected_col: f64 = rows[4][4].parse().unwrap();
        assert!((projected_col - 16.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic_output() {
        let scenario = small_scenario();
        let cumulative = scenario.series.cumulative();
        let projected = vec![1.0, 2.0, 4.0];

        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_results(&mut buf1, &scenario, &cumulative, &projected).unwrap();
        write_results(&mut buf2, &scenario, &cumulative, &projected).unwrap();
        assert_eq!(buf1, buf2);
    }
}
