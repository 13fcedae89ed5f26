//! Calendar-month arithmetic shared by listings and reports.
//!
//! Months are represented as the first day of the month; ranges are
//! half-open (`start <= date < end`).

use chrono::{Datelike, NaiveDate};

use crate::{EngineError, ResultEngine};

/// Parse a `YYYY-MM` month parameter into the first day of that month.
pub fn parse_month(input: &str) -> Option<NaiveDate> {
    let (year, month) = input.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 always exists for a valid year/month pair
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Half-open bounds of a month: `(first day, first day of next month)`.
pub fn month_bounds(month: NaiveDate) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let start = first_of_month(month);
    let end = add_months(start, 1)?;
    Ok((start, end))
}

/// Shift a first-of-month date by `k` months (negative to go back).
pub fn add_months(month: NaiveDate, k: i32) -> ResultEngine<NaiveDate> {
    let zero_based = month.year() * 12 + month.month() as i32 - 1 + k;
    let year = zero_based.div_euclid(12);
    let new_month = zero_based.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, new_month, 1)
        .ok_or_else(|| EngineError::InvalidDate(format!("month out of range: {year}-{new_month}")))
}

/// Format a month as `YYYY-MM`.
pub fn month_str(month: NaiveDate) -> String {
    format!("{:04}-{:02}", month.year(), month.month())
}

/// Number of days in the month starting at `month`.
pub fn days_in_month(month: NaiveDate) -> ResultEngine<u32> {
    let (start, end) = month_bounds(month)?;
    Ok((end - start).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_month_accepts_year_dash_month() {
        assert_eq!(parse_month("2026-02"), Some(d(2026, 2, 1)));
        assert_eq!(parse_month("2026-13"), None);
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn bounds_are_half_open() {
        let (start, end) = month_bounds(d(2025, 12, 15)).unwrap();
        assert_eq!(start, d(2025, 12, 1));
        assert_eq!(end, d(2026, 1, 1));
    }

    #[test]
    fn add_months_crosses_year_boundaries() {
        assert_eq!(add_months(d(2026, 1, 1), -1).unwrap(), d(2025, 12, 1));
        assert_eq!(add_months(d(2025, 11, 1), 3).unwrap(), d(2026, 2, 1));
        assert_eq!(add_months(d(2026, 6, 1), -18).unwrap(), d(2024, 12, 1));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(d(2024, 2, 1)).unwrap(), 29);
        assert_eq!(days_in_month(d(2025, 2, 1)).unwrap(), 28);
        assert_eq!(days_in_month(d(2026, 4, 1)).unwrap(), 30);
    }
}
