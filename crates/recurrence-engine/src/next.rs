//! Next-occurrence search.
//!
//! Given a reference date ("today", or the day a task was completed), the
//! task's current date (the anchor) and a [`RecurrenceRule`], compute the
//! earliest qualifying date strictly after the reference.
//!
//! Each kind advances forward only:
//!
//! - **Daily** steps the anchor by the interval. At least one step is taken.
//! - **Yearly** steps the anchor one year at a time, at least once. Steps
//!   accumulate, so a Feb 29 anchor that lands on Feb 28 stays there.
//! - **Weekly** walks day by day from the *reference* date; the anchor does
//!   not take part in the search.
//! - **Monthly** walks day by day from the anchor itself, jumping over months
//!   excluded by the month filter.
//!
//! The search never reads the system clock. The caller supplies the reference.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::date::{add_days, add_years, first_of_next_month, format_date, iso_weekday, parse_date};
use crate::error::{EngineError, Result};
use crate::rule::{DayMark, RecurrenceRule};

/// Compute the next occurrence of `rule` strictly after `reference`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRule`] for a daily rule with a zero interval
/// (only constructible by hand; the parser rejects it), or
/// [`EngineError::InvalidDate`] if the search runs off the end of the
/// supported calendar.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::next::next_occurrence;
/// use recurrence_engine::rule::RecurrenceRule;
///
/// let reference = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let rule = RecurrenceRule::parse("d 3").unwrap();
///
/// let next = next_occurrence(reference, anchor, &rule).unwrap();
/// assert_eq!(next, NaiveDate::from_ymd_opt(2024, 1, 13).unwrap());
/// ```
pub fn next_occurrence(
    reference: NaiveDate,
    anchor: NaiveDate,
    rule: &RecurrenceRule,
) -> Result<NaiveDate> {
    match rule {
        RecurrenceRule::Daily { interval_days } => next_daily(reference, anchor, *interval_days),
        RecurrenceRule::Yearly => next_yearly(reference, anchor),
        RecurrenceRule::Weekly { weekdays } => next_weekly(reference, weekdays),
        RecurrenceRule::Monthly { days, months } => next_monthly(reference, anchor, days, months),
    }
}

/// Compute the next occurrence from a textual anchor date and rule.
///
/// This is the boundary used by request handlers: the anchor is a `YYYYMMDD`
/// string and the result is rendered the same way. An empty rule is reported
/// before the anchor is looked at.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRule`] for an empty or malformed rule and
/// [`EngineError::InvalidDate`] for a malformed anchor.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::next_date;
///
/// let reference = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(next_date(reference, "20240131", "m -1").unwrap(), "20240331");
/// ```
pub fn next_date(reference: NaiveDate, anchor: &str, rule: &str) -> Result<String> {
    if rule.is_empty() {
        return Err(EngineError::InvalidRule("rule is empty".to_string()));
    }
    let anchor = parse_date(anchor)?;
    let rule = RecurrenceRule::parse(rule)?;
    next_occurrence(reference, anchor, &rule).map(format_date)
}

/// Fully textual form of [`next_date`]: the reference date is a `YYYYMMDD`
/// string as well.
///
/// # Errors
///
/// As [`next_date`], plus [`EngineError::InvalidDate`] for a malformed
/// reference date.
pub fn compute_next_occurrence(reference: &str, anchor: &str, rule: &str) -> Result<String> {
    let reference = parse_date(reference)?;
    next_date(reference, anchor, rule)
}

// ── Per-kind searches ───────────────────────────────────────────────────────

const MONTHLY_HORIZON_YEARS: u32 = 9;

fn next_daily(reference: NaiveDate, anchor: NaiveDate, interval_days: u32) -> Result<NaiveDate> {
    if interval_days == 0 {
        return Err(EngineError::InvalidRule(
            "daily interval of 0 never advances".to_string(),
        ));
    }

    // Closed form of "add the interval until strictly after the reference".
    let interval = u64::from(interval_days);
    let steps = if anchor > reference {
        1
    } else {
        let behind = (reference - anchor).num_days().unsigned_abs();
        behind / interval + 1
    };
    add_days(anchor, steps * interval)
}

fn next_yearly(reference: NaiveDate, anchor: NaiveDate) -> Result<NaiveDate> {
    let mut date = anchor;
    loop {
        date = add_years(date, 1)?;
        if date > reference {
            return Ok(date);
        }
    }
}

fn next_weekly(reference: NaiveDate, weekdays: &BTreeSet<u32>) -> Result<NaiveDate> {
    let mut date = reference;
    // Every weekday occurs once in any seven consecutive days.
    for _ in 0..7 {
        date = add_days(date, 1)?;
        if weekdays.contains(&iso_weekday(date)) {
            return Ok(date);
        }
    }
    Err(EngineError::InvalidRule(
        "weekly rule lists no weekdays".to_string(),
    ))
}

fn next_monthly(
    reference: NaiveDate,
    anchor: NaiveDate,
    days: &BTreeSet<DayMark>,
    months: &BTreeSet<u32>,
) -> Result<NaiveDate> {
    if days.is_empty() {
        return Err(EngineError::InvalidRule(
            "monthly rule lists no days".to_string(),
        ));
    }

    // Feb 29 is the sparsest day a parsed rule can select, at most 8 years apart.
    let horizon = add_years(anchor.max(reference), MONTHLY_HORIZON_YEARS).unwrap_or(NaiveDate::MAX);

    let mut date = anchor;
    loop {
        if date > horizon {
            return Err(EngineError::InvalidRule(
                "monthly rule never selects a day in its months".to_string(),
            ));
        }

        if !months.is_empty() && !months.contains(&date.month()) {
            date = first_of_next_month(date)?;
            continue;
        }

        if date > reference && days.iter().any(|mark| mark.matches(date)) {
            return Ok(date);
        }

        date = add_days(date, 1)?;
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
