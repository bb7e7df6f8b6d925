//! Calendar date codec and calendar arithmetic.
//!
//! Dates cross the library boundary as 8-digit `YYYYMMDD` strings and are
//! handled internally as [`NaiveDate`] values: a proleptic Gregorian
//! year/month/day with no time of day and no timezone.
//!
//! Parsing is strict. A string that looks like a date but names a day that
//! does not exist (`20241301`, `20240230`) is rejected rather than rolled over
//! into a neighbouring month.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{EngineError, Result};

/// The wire format for dates: `YYYYMMDD`.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// The search-box format for dates: `DD.MM.YYYY`.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

// ── Codec ───────────────────────────────────────────────────────────────────

/// Parse a `YYYYMMDD` string into a calendar date.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] unless the input is exactly eight ASCII
/// digits naming a real calendar day.
///
/// # Examples
///
/// ```
/// use recurrence_engine::date::parse_date;
///
/// let date = parse_date("20240229").unwrap();
/// assert_eq!(date.to_string(), "2024-02-29");
/// assert!(parse_date("20230229").is_err());
/// assert!(parse_date("2024-02-29").is_err());
/// ```
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::InvalidDate(format!(
            "'{s}': expected 8 digits in YYYYMMDD format"
        )));
    }

    // All-digit input of known width, so these slices and parses cannot fail.
    let year: i32 = s[0..4].parse().map_err(|_| invalid_date(s))?;
    let month: u32 = s[4..6].parse().map_err(|_| invalid_date(s))?;
    let day: u32 = s[6..8].parse().map_err(|_| invalid_date(s))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        EngineError::InvalidDate(format!("'{s}': no such calendar day"))
    })
}

/// Render a calendar date as `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `DD.MM.YYYY` date as typed into a search box.
///
/// Returns `None` for anything that is not a well-formed, existing date, so
/// callers can fall back to treating the input as free text.
pub fn parse_display_date(s: &str) -> Option<NaiveDate> {
    // chrono accepts unpadded fields; search input must be DD.MM.YYYY exactly.
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'.' || bytes[5] != b'.' {
        return None;
    }
    if !s.split('.').all(|field| field.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    NaiveDate::parse_from_str(s, DISPLAY_DATE_FORMAT).ok()
}

// ── Calendar arithmetic ─────────────────────────────────────────────────────

/// ISO 8601 weekday number: Monday = 1 … Sunday = 7.
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// Last day-of-month number for the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    match first_of_next_month(date).ok().and_then(|next| next.pred_opt()) {
        Some(last) => last.day(),
        // December of the last representable year.
        None => 31,
    }
}

/// Add `n` calendar days.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] if the result leaves the representable
/// calendar range.
pub fn add_days(date: NaiveDate, n: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(n))
        .ok_or_else(|| out_of_range(date))
}

/// Add `n` calendar years.
///
/// A Feb 29 date lands on Feb 28 when the target year is not a leap year.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] if the result leaves the representable
/// calendar range.
pub fn add_years(date: NaiveDate, n: u32) -> Result<NaiveDate> {
    let months = n.checked_mul(12).ok_or_else(|| out_of_range(date))?;
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| out_of_range(date))
}

/// The 1st of the month following the month containing `date`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] if the result leaves the representable
/// calendar range.
pub fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| out_of_range(date))
}

fn invalid_date(s: &str) -> EngineError {
    EngineError::InvalidDate(format!("'{s}'"))
}

fn out_of_range(date: NaiveDate) -> EngineError {
    EngineError::InvalidDate(format!(
        "'{}': calendar arithmetic out of range",
        format_date(date)
    ))
}

// ── Tests ───────────────────────────────────────────────────────────────────
