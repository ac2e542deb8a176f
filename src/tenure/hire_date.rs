//! Lenient parsing of free-text hire-date attributes.
//!
//! Directory extension attributes carry whatever the HR feed wrote, so a
//! range of common shapes is accepted. Values with an explicit offset are
//! converted to the local time zone before the calendar date is taken.
//! Slash-separated dates are read month first.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parses a raw attribute value into a calendar date.
///
/// Returns `None` when no supported format matches.
pub fn parse_hire_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(parse_hire_date("2019-03-04"), Some(date(2019, 3, 4)));
        assert_eq!(parse_hire_date("  2019-03-04\n"), Some(date(2019, 3, 4)));
        assert_eq!(parse_hire_date("2019/03/04"), Some(date(2019, 3, 4)));
    }

    #[test]
    fn test_rfc3339_uses_local_date() {
        let expected = DateTime::parse_from_rfc3339("2019-03-04T12:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(parse_hire_date("2019-03-04T12:00:00Z"), Some(expected));

        let expected = DateTime::parse_from_rfc3339("2019-03-04T23:30:00+05:00")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(parse_hire_date("2019-03-04T23:30:00+05:00"), Some(expected));
    }

    #[test]
    fn test_naive_date_time() {
        assert_eq!(
            parse_hire_date("2019-03-04T08:30:00"),
            Some(date(2019, 3, 4))
        );
        assert_eq!(
            parse_hire_date("2019-03-04 08:30:00.123"),
            Some(date(2019, 3, 4))
        );
        assert_eq!(
            parse_hire_date("3/4/2019 9:15:00 AM"),
            Some(date(2019, 3, 4))
        );
    }

    #[test]
    fn test_us_and_european_forms() {
        assert_eq!(parse_hire_date("03/04/2019"), Some(date(2019, 3, 4)));
        assert_eq!(parse_hire_date("3/4/2019"), Some(date(2019, 3, 4)));
        assert_eq!(parse_hire_date("04.03.2019"), Some(date(2019, 3, 4)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_hire_date("4 Mar 2019"), Some(date(2019, 3, 4)));
        assert_eq!(parse_hire_date("March 4, 2019"), Some(date(2019, 3, 4)));
        assert_eq!(parse_hire_date("Mar 4, 2019"), Some(date(2019, 3, 4)));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(parse_hire_date("not-a-date"), None);
        assert_eq!(parse_hire_date(""), None);
        assert_eq!(parse_hire_date("   "), None);
        assert_eq!(parse_hire_date("2019-02-30"), None);
        assert_eq!(parse_hire_date("13/01/2019"), None);
    }
}
