//! NALD date parsing helpers
//!
//! NALD stores dates as `DD/MM/YYYY` text, with the literal string `null`
//! (or an empty field) standing in for an absent value. Transfer dates carry
//! a time component which is irrelevant to interval arithmetic and is
//! truncated here.

use chrono::NaiveDate;

/// Parse a NALD date field (`DD/MM/YYYY`).
///
/// Returns `None` for the literal string `null`, empty fields, and anything
/// unparseable. Unparseable values are treated as absent rather than an
/// error: a single bad date in a historical edit must not sink the whole
/// interval merge.
pub fn parse_nald_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}

/// Parse a NALD transfer date (`DD/MM/YYYY HH24:MI:SS`), truncated to a date.
///
/// Falls back to plain date parsing for rows without a time component.
pub fn parse_transfer_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    chrono::NaiveDateTime::parse_from_str(trimmed, "%d/%m/%Y %H:%M:%S")
        .map(|dt| dt.date())
        .ok()
        .or_else(|| parse_nald_date(trimmed))
}

/// Earliest of the present dates, `None` if all are absent
pub fn min_date<I>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    dates.into_iter().flatten().min()
}

/// Latest of the present dates, `None` if all are absent
pub fn max_date<I>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    dates.into_iter().flatten().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_nald_dates() {
        assert_eq!(parse_nald_date("01/04/2019"), Some(d(2019, 4, 1)));
        assert_eq!(parse_nald_date("null"), None);
        assert_eq!(parse_nald_date(""), None);
        assert_eq!(parse_nald_date("2019-04-01"), None);
        assert_eq!(parse_nald_date("31/02/2019"), None);
    }

    #[test]
    fn parses_transfer_dates() {
        assert_eq!(
            parse_transfer_date("25/12/2003 10:32:17"),
            Some(d(2003, 12, 25))
        );
        assert_eq!(parse_transfer_date("25/12/2003"), Some(d(2003, 12, 25)));
        assert_eq!(parse_transfer_date("null"), None);
    }

    #[test]
    fn min_max_skip_absent_values() {
        let dates = [None, Some(d(2019, 8, 1)), Some(d(2019, 10, 4)), None];
        assert_eq!(min_date(dates), Some(d(2019, 8, 1)));
        assert_eq!(max_date(dates), Some(d(2019, 10, 4)));
        assert_eq!(min_date([None, None]), None);
    }
}
