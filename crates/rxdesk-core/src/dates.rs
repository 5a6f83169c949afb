//! Lenient date parsing for hand-entered record fields.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted formats, tried in order; the first successful parse wins.
pub const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d-%m-%y", "%d/%m/%Y", "%Y-%m-%d"];

/// Digit layout for each entry of [`DATE_FORMATS`].
///
/// chrono's `%Y` accepts any number of digits, so "05-11-26" would otherwise
/// parse as year 26 under the first format instead of falling through to `%y`.
static DATE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{1,2}-\d{1,2}-\d{4}$",
        r"^\d{1,2}-\d{1,2}-\d{2}$",
        r"^\d{1,2}/\d{1,2}/\d{4}$",
        r"^\d{4}-\d{1,2}-\d{1,2}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid date shape"))
    .collect()
});

/// Parse a date in any of the [`DATE_FORMATS`].
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .zip(DATE_SHAPES.iter())
        .filter(|(_, shape)| shape.is_match(input))
        .find_map(|(fmt, _)| {
            let date = NaiveDate::parse_from_str(input, fmt).ok()?;
            Some(if *fmt == "%d-%m-%y" { pivot_two_digit_year(date) } else { date })
        })
}

/// Two-digit years 69-99 belong to the 1900s; chrono puts 69 in 2069.
fn pivot_two_digit_year(date: NaiveDate) -> NaiveDate {
    if date.year() == 2069 {
        date.with_year(1969).unwrap_or(date)
    } else {
        date
    }
}

/// Whole years between `dob` and `today`, counting a birthday only once reached.
pub fn age_on(dob: &str, today: NaiveDate) -> Option<i64> {
    let birth = parse_date(dob)?;
    let mut age = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_formats() {
        assert_eq!(parse_date("05-11-2026"), Some(date(2026, 11, 5)));
        assert_eq!(parse_date("05-11-26"), Some(date(2026, 11, 5)));
        assert_eq!(parse_date("05/11/2026"), Some(date(2026, 11, 5)));
        assert_eq!(parse_date("2026-11-05"), Some(date(2026, 11, 5)));
    }

    #[test]
    fn test_two_digit_year_not_read_as_four_digit() {
        assert_eq!(parse_date("01-02-99"), Some(date(1999, 2, 1)));
        assert_eq!(parse_date("1-2-2026"), Some(date(2026, 2, 1)));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_date("01-01-68"), Some(date(2068, 1, 1)));
        assert_eq!(parse_date("01-01-69"), Some(date(1969, 1, 1)));
        assert_eq!(parse_date("01-01-70"), Some(date(1970, 1, 1)));
        assert_eq!(age_on("01-01-69", date(2026, 10, 19)), Some(57));
        // Four-digit 2069 is taken as written
        assert_eq!(parse_date("01-01-2069"), Some(date(2069, 1, 1)));
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(parse_date("  2026-11-05 "), Some(date(2026, 11, 5)));
    }

    #[test]
    fn test_rejects_unknown() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date("11/05/2026x"), None);
        assert_eq!(parse_date("2026/11/05"), None);
        assert_eq!(parse_date("31-02-2026"), None);
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let today = date(2026, 10, 19);
        assert_eq!(age_on("20-10-1956", today), Some(69));
        assert_eq!(age_on("19-10-1956", today), Some(70));
        assert_eq!(age_on("1956-01-01", today), Some(70));
        assert_eq!(age_on("unknown", today), None);
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(date(2026, 10, 9), date(2026, 10, 19)), 10);
        assert_eq!(days_between(date(2026, 10, 19), date(2026, 10, 9)), -10);
    }
}
