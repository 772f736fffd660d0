//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed cumulative counts: `o`
//! - projected trend: `-` line, starting at the display day
//! - day markers: `*` (drawn last so they stay visible)
//!
//! With a log-scale chart the y axis is fixed to `[1, y_axis_upper]` in
//! log10 space; linear charts size the axis from the drawn data.

use crate::domain::{ChartOptions, DayMarker};

/// Render the observed series, the projected trend, and markers.
///
/// The x axis always spans days `0..=projected.len() - 1`; the projected
/// trace is drawn from `display_from_day` onward.
pub fn render_ascii_plot(
    cumulative: &[u64],
    projected: &[f64],
    markers: &[DayMarker],
    chart: &ChartOptions,
    display_from_day: usize,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let end_day = projected.len().saturating_sub(1);
    let x_max = end_day.max(1) as f64;

    let to_plot_y = |v: f64| -> f64 {
        if chart.log_scale {
            // Counts below one sit on the axis floor, matching a log axis
            // that starts at 1.
            v.max(1.0).log10()
        } else {
            v
        }
    };

    let (y_min, y_max) = if chart.log_scale {
        (0.0, chart.y_axis_upper.log10())
    } else {
        let (lo, hi) = linear_y_range(cumulative, &projected[display_from_day.min(projected.len())..], markers)
            .unwrap_or((0.0, 1.0));
        pad_range(lo, hi, 0.05)
    };

    let mut grid = vec![vec![' '; width]; height];

    // Draw the projection first (so points can overlay).
    let curve: Vec<(f64, f64)> = (display_from_day..projected.len())
        .map(|day| (day as f64, to_plot_y(projected[day])))
        .collect();
    draw_curve(&mut grid, &curve, x_max, y_min, y_max);

    for (day, &count) in cumulative.iter().enumerate() {
        let x = map_x(day as f64, x_max, width);
        let y = map_y(to_plot_y(count as f64), y_min, y_max, height);
        grid[y][x] = 'o';
    }

    for m in markers {
        let x = map_x(m.day as f64, x_max, width);
        let y = map_y(to_plot_y(m.y), y_min, y_max, height);
        grid[y][x] = '*';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    if chart.log_scale {
        out.push_str(&format!(
            "Plot: days=[0, {end_day}] | y=[1, {:.0}] cases (log10 axis)\n",
            chart.y_axis_upper
        ));
    } else {
        out.push_str(&format!(
            "Plot: days=[0, {end_day}] | y=[{y_min:.1}, {y_max:.1}] cases\n"
        ));
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn linear_y_range(
    cumulative: &[u64],
    displayed_projection: &[f64],
    markers: &[DayMarker],
) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &count in cumulative {
        min_y = min_y.min(count as f64);
        max_y = max_y.max(count as f64);
    }
    for &v in displayed_projection {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    for m in markers {
        min_y = min_y.min(m.y);
        max_y = max_y.max(m.y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(day: f64, max_day: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (day / max_day).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(day, y) in curve {
        let x = map_x(day, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarkerSource;
    use chrono::NaiveDate;

    fn chart(log_scale: bool, y_axis_upper: f64) -> ChartOptions {
        ChartOptions {
            log_scale,
            y_axis_upper,
            marker_days: vec![],
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            observed_name: String::new(),
            projection_name: String::new(),
            marker_suffix: String::new(),
        }
    }

    fn marker(day: usize, y: f64) -> DayMarker {
        DayMarker {
            day,
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            offset_days: 0,
            source: MarkerSource::Projected,
            count: Some(y as u64),
            label: String::new(),
            y,
        }
    }

    #[test]
    fn plot_golden_snapshot_linear() {
        let cumulative = vec![10, 20, 30];
        let projected = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let markers = vec![marker(3, 40.0)];

        let txt = render_ascii_plot(&cumulative, &projected, &markers, &chart(false, 0.0), 0, 11, 5);
        let expected = concat!(
            "Plot: days=[0, 4] | y=[8.0, 52.0] cases\n",
            "         --\n",
            "       -*  \n",
            "    -o-    \n",
            "  -o       \n",
            "o-         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn plot_golden_snapshot_log_axis() {
        // Powers of ten land on an exact diagonal in log10 space.
        let cumulative = vec![1, 100, 10_000];
        let projected = vec![1.0, 100.0, 10_000.0];

        let txt = render_ascii_plot(&cumulative, &projected, &[], &chart(true, 10_000.0), 0, 13, 5);
        let expected = concat!(
            "Plot: days=[0, 2] | y=[1, 10000] cases (log10 axis)\n",
            "           -o\n",
            "        ---  \n",
            "     -o-     \n",
            "  ---        \n",
            "o-           \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn projection_trace_starts_at_display_day() {
        let projected = vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0];

        let txt = render_ascii_plot(&[], &projected, &[], &chart(false, 0.0), 3, 11, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);

        // Days 0..3 map to columns 0..6; nothing may be drawn there.
        for row in &rows {
            assert!(row[..6].chars().all(|c| c == ' '), "unexpected ink in {row:?}");
        }
        assert!(txt.contains('-'));
    }

    #[test]
    fn log_axis_clamps_counts_below_one() {
        // Day 0 has no confirmed cases yet; it sits on the axis floor
        // instead of deforming the scale.
        let cumulative = vec![0, 10, 100];
        let projected = vec![1.0, 10.0, 100.0];

        let txt = render_ascii_plot(&cumulative, &projected, &[], &chart(true, 100.0), 0, 11, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows[4].chars().next(), Some('o'));
        assert_eq!(rows[0].chars().last(), Some('o'));
    }
}
