//! Bundled Covid-19 Iceland case counts.
//!
//! Daily confirmed case counts from <https://www.covid.is/tolulegar-upplysingar>,
//! transcribed from the site's bar chart and then kept up by hand against the
//! announced totals. Day 0 is the first confirmed case, 2020-02-28.
//!
//! Two snapshots are bundled, named for the last date they cover. Each one
//! backs a scenario preset in [`crate::config`].

/// Date of the first confirmed case, day 0 of every bundled series.
pub const EPOCH_DATE: &str = "2020-02-28";

/// Daily new confirmed cases through March 14 2020 (the March 14 count was
/// still partial when recorded).
pub const MARCH14_DAILY: [u32; 15] = [1, 1, 2, 8, 5, 13, 9, 8, 6, 6, 9, 13, 23, 14, 20];

/// Daily new confirmed cases through March 26 2020.
pub const MARCH27_DAILY: [u32; 28] = [
    1, 0, 3, 6, 5, 15, 8, 9, 7, 5, 9, 14, 24, 16, 20, 24, 20, 22, 53, 78, 77, 60, 91, 22, 67, 106,
    41, 87,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CaseSeries;
    use chrono::NaiveDate;

    fn epoch() -> NaiveDate {
        NaiveDate::parse_from_str(EPOCH_DATE, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn march14_cumulative_matches_announced_totals() {
        let series = CaseSeries::new(epoch(), MARCH14_DAILY.to_vec());
        let cumulative = series.cumulative();
        assert_eq!(cumulative.len(), 15);
        assert_eq!(cumulative[0], 1);
        assert_eq!(cumulative[13], 118);
        assert_eq!(cumulative[14], 138);
    }

    #[test]
    fn march27_cumulative_matches_announced_totals() {
        let series = CaseSeries::new(epoch(), MARCH27_DAILY.to_vec());
        let cumulative = series.cumulative();
        assert_eq!(cumulative.len(), 28);
        // Day 25 was the announced total on March 24.
        assert_eq!(cumulative[25], 762);
        assert_eq!(cumulative[27], 890);
    }

    #[test]
    fn datasets_share_the_epoch() {
        // Both snapshots start at the first confirmed case, so their early
        // days must agree up to revisions of the counts.
        let series = CaseSeries::new(epoch(), MARCH27_DAILY.to_vec());
        assert_eq!(series.date_of_day(0), epoch());
        assert_eq!(
            series.date_of_day(27),
            NaiveDate::from_ymd_opt(2020, 3, 26).unwrap()
        );
    }
}
