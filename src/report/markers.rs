//! Day markers: `(T+offset, count)` annotations for selected days.
//!
//! Offsets count from the as-of date (T+0 is "today"), so the same scenario
//! rendered on different days produces different labels. The count comes from
//! observed data for past days and from the projection for future days; the
//! marker's y position always sits on the projected curve, which is close
//! enough to the observed one inside the fitted range.

use chrono::NaiveDate;

use crate::domain::{DayMarker, MarkerSource};

/// Builds markers for `marker_days`.
///
/// `projected` must cover days `0..=end_day`; marker days beyond it are
/// skipped. Past days beyond the observed series fall back to the projection
/// instead of failing, so stale series still render.
pub fn compute_markers(
    epoch_date: NaiveDate,
    cumulative: &[u64],
    projected: &[f64],
    marker_days: &[usize],
    suffix: &str,
    as_of: NaiveDate,
) -> Vec<DayMarker> {
    marker_days
        .iter()
        .copied()
        .filter(|&day| day < projected.len())
        .map(|day| {
            let date = epoch_date + chrono::Days::new(day as u64);
            let offset_days = (date - as_of).num_days();
            let observed = cumulative.get(day).copied();

            let (source, count) = if offset_days > 0 {
                (MarkerSource::Projected, Some(projected[day] as u64))
            } else if offset_days < 0 {
                match observed {
                    Some(c) => (MarkerSource::Observed, Some(c)),
                    None => (MarkerSource::Projected, Some(projected[day] as u64)),
                }
            } else {
                // Today only gets a count once the day's numbers are in.
                match observed {
                    Some(c) => (MarkerSource::Observed, Some(c)),
                    None => (MarkerSource::None, None),
                }
            };

            let label = match count {
                Some(c) => format!("(T{offset_days:+}, {c}{suffix})"),
                None => "(T+0)".to_string(),
            };

            DayMarker {
                day,
                date,
                offset_days,
                source,
                count,
                label,
                y: projected[day],
            }
        })
        .collect()
}
