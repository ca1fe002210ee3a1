//! Calendar-day arithmetic over civil dates.
//!
//! All functions operate on `chrono::NaiveDate` (year, month, day) values and
//! never touch time zones. End dates are inclusive: a unit that starts on the
//! 11th with a 5-day duration ends on the 15th.

use chrono::{Days, NaiveDate};
use sitework_util::errors::SiteworkError;

/// The only accepted textual date form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` civil date.
pub fn parse_date(s: &str) -> Result<NaiveDate, SiteworkError> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(SiteworkError::validation(format!(
            "invalid date '{s}': expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| SiteworkError::validation(format!("invalid date '{s}': {e}")))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Shift a date by a signed number of calendar days.
pub fn shift(date: NaiveDate, delta_days: i64) -> Result<NaiveDate, SiteworkError> {
    let magnitude = Days::new(delta_days.unsigned_abs());
    let shifted = if delta_days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.ok_or_else(|| {
        SiteworkError::validation(format!(
            "date {} shifted by {delta_days} days is out of range",
            format_date(date)
        ))
    })
}

/// The day after `date`.
pub fn next_day(date: NaiveDate) -> Result<NaiveDate, SiteworkError> {
    shift(date, 1)
}

/// Signed number of days from `from` to `to` (`to - from`).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Last elapsed day of a unit.
///
/// The working span covers `max(duration_days, 1)` days starting on `start`
/// (a zero-duration unit is a milestone on its start day), and the buffer is
/// appended after the last working day.
pub fn end_date(
    start: NaiveDate,
    duration_days: u32,
    buffer_days: u32,
) -> Result<NaiveDate, SiteworkError> {
    let span = i64::from(duration_days.max(1)) - 1 + i64::from(buffer_days);
    shift(start, span)
}

/// Inclusive day count from `start` to `end`, never less than 1.
pub fn duration_from_end_date(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = days_between(start, end) + 1;
    u32::try_from(days.max(1)).unwrap_or(u32::MAX)
}
