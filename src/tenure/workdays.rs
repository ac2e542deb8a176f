//! Working-day and elapsed-year arithmetic.

use chrono::{Datelike, NaiveDate};

/// Fixed divisor for elapsed years. Leap years are not special-cased.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Counts Monday–Friday dates in `[start, end]`, both ends included.
///
/// Returns 0 when `end` is before `start`. No holiday calendar is applied.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u64 {
    if end < start {
        return 0;
    }

    let total_days = end.signed_duration_since(start).num_days() as u64 + 1;
    let full_weeks = total_days / 7;
    let remainder = total_days % 7;

    // The leftover days start on the same weekday as `start`.
    let first = u64::from(start.weekday().num_days_from_monday());
    let leftover_weekdays = (0..remainder).filter(|i| (first + i) % 7 < 5).count() as u64;

    full_weeks * 5 + leftover_weekdays
}

/// Whole days from `start` to `end` divided by [`DAYS_PER_YEAR`].
///
/// Negative when `start` is after `end`.
pub fn elapsed_years(start: NaiveDate, end: NaiveDate) -> f64 {
    end.signed_duration_since(start).num_days() as f64 / DAYS_PER_YEAR
}
