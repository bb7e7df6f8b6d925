//! Recurrence rule grammar.
//!
//! A rule is a short ASCII string of single-space-separated tokens. The first
//! token selects the kind:
//!
//! | Kind    | Grammar                                       | Example        |
//! |---------|-----------------------------------------------|----------------|
//! | Daily   | `d <1..400>`                                  | `d 3`          |
//! | Yearly  | `y`                                           | `y`            |
//! | Weekly  | `w <1..7>(,<1..7>)*`                          | `w 1,3,5`      |
//! | Monthly | `m <-2..31, not 0>(,...)* [<1..12>(,...)*]`   | `m 15,-1 1,6`  |
//!
//! Parsing produces a [`RecurrenceRule`] once; everything downstream matches on
//! the enum instead of re-inspecting the text.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::date::last_day_of_month;
use crate::error::{EngineError, Result};

/// Largest interval accepted by a daily rule.
pub const MAX_INTERVAL_DAYS: u32 = 400;

/// Any leap year; used to ask "can this day ever occur in month M".
const REFERENCE_LEAP_YEAR: i32 = 2000;

// ── DayMark ─────────────────────────────────────────────────────────────────

/// A day selector inside a monthly rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayMark {
    /// A fixed day of the month (1-31).
    Day(u32),
    /// The day before the last day of the month (`-2`).
    SecondToLast,
    /// The last day of the month (`-1`).
    Last,
}

impl DayMark {
    /// Decode the numeric form used in rule text.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            -2 => Some(DayMark::SecondToLast),
            -1 => Some(DayMark::Last),
            1..=31 => Some(DayMark::Day(value as u32)),
            _ => None,
        }
    }

    /// The numeric form used in rule text.
    pub fn value(self) -> i32 {
        match self {
            DayMark::Day(day) => day as i32,
            DayMark::SecondToLast => -2,
            DayMark::Last => -1,
        }
    }

    /// Whether `date` is the day this mark selects in its own month.
    pub fn matches(self, date: NaiveDate) -> bool {
        let day = date.day();
        match self {
            DayMark::Day(n) => day == n,
            DayMark::Last => day == last_day_of_month(date),
            DayMark::SecondToLast => day + 1 == last_day_of_month(date),
        }
    }

    /// Whether this mark can fall in `month` in at least some year.
    fn can_occur_in(self, month: u32) -> bool {
        match self {
            DayMark::Day(n) => NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, 1)
                .is_some_and(|first| n <= last_day_of_month(first)),
            DayMark::SecondToLast | DayMark::Last => true,
        }
    }
}

// ── RuleKind ────────────────────────────────────────────────────────────────

/// The kind of a [`RecurrenceRule`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Daily,
    Yearly,
    Weekly,
    Monthly,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Daily => "daily",
            RuleKind::Yearly => "yearly",
            RuleKind::Weekly => "weekly",
            RuleKind::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

// ── RecurrenceRule ──────────────────────────────────────────────────────────

/// A parsed and validated recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Every `interval_days` days counted from the anchor.
    Daily { interval_days: u32 },
    /// Same month and day every year.
    Yearly,
    /// On the listed ISO weekdays (1 = Monday … 7 = Sunday).
    Weekly { weekdays: BTreeSet<u32> },
    /// On the listed days of the month, optionally only in the listed months.
    /// An empty `months` set means every month.
    Monthly {
        days: BTreeSet<DayMark>,
        months: BTreeSet<u32>,
    },
}

impl RecurrenceRule {
    /// Parse and validate rule text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRule`] for an empty rule, an unsupported
    /// prefix, a wrong token count, an unparsable or out-of-range number, or a
    /// monthly rule none of whose days can ever fall in its permitted months.
    ///
    /// # Examples
    ///
    /// ```
    /// use recurrence_engine::rule::{RecurrenceRule, RuleKind};
    ///
    /// let rule = RecurrenceRule::parse("m 15,-1 1,6").unwrap();
    /// assert_eq!(rule.kind(), RuleKind::Monthly);
    /// assert_eq!(rule.to_string(), "m 15,-1 1,6");
    ///
    /// assert!(RecurrenceRule::parse("d 500").is_err());
    /// ```
    pub fn parse(rule: &str) -> Result<Self> {
        if rule.is_empty() {
            return Err(EngineError::InvalidRule("rule is empty".to_string()));
        }

        let tokens: Vec<&str> = rule.split(' ').collect();
        match tokens[0] {
            "d" => parse_daily(rule, &tokens),
            "y" => parse_yearly(rule, &tokens),
            "w" => parse_weekly(rule, &tokens),
            "m" => parse_monthly(rule, &tokens),
            _ => Err(EngineError::InvalidRule(format!(
                "unsupported rule: '{rule}'"
            ))),
        }
    }

    /// The rule's kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            RecurrenceRule::Daily { .. } => RuleKind::Daily,
            RecurrenceRule::Yearly => RuleKind::Yearly,
            RecurrenceRule::Weekly { .. } => RuleKind::Weekly,
            RecurrenceRule::Monthly { .. } => RuleKind::Monthly,
        }
    }
}

impl FromStr for RecurrenceRule {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        RecurrenceRule::parse(s)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceRule::Daily { interval_days } => write!(f, "d {interval_days}"),
            RecurrenceRule::Yearly => f.write_str("y"),
            RecurrenceRule::Weekly { weekdays } => write!(f, "w {}", join(weekdays.iter())),
            RecurrenceRule::Monthly { days, months } => {
                write!(f, "m {}", join(days.iter().map(|d| d.value())))?;
                if !months.is_empty() {
                    write!(f, " {}", join(months.iter()))?;
                }
                Ok(())
            }
        }
    }
}

// ── Per-kind parsers ────────────────────────────────────────────────────────

fn parse_daily(rule: &str, tokens: &[&str]) -> Result<RecurrenceRule> {
    if tokens.len() != 2 {
        return Err(EngineError::InvalidRule(format!(
            "'{rule}': expected 'd <days>'"
        )));
    }

    let interval_days = parse_number(tokens[1])
        .filter(|n| (1..=MAX_INTERVAL_DAYS as i32).contains(n))
        .ok_or_else(|| {
            EngineError::InvalidRule(format!(
                "'{}': interval must be between 1 and {MAX_INTERVAL_DAYS}",
                tokens[1]
            ))
        })?;

    Ok(RecurrenceRule::Daily {
        interval_days: interval_days as u32,
    })
}

fn parse_yearly(rule: &str, tokens: &[&str]) -> Result<RecurrenceRule> {
    if tokens.len() != 1 {
        return Err(EngineError::InvalidRule(format!(
            "'{rule}': yearly rule takes no parameters"
        )));
    }
    Ok(RecurrenceRule::Yearly)
}

fn parse_weekly(rule: &str, tokens: &[&str]) -> Result<RecurrenceRule> {
    if tokens.len() != 2 {
        return Err(EngineError::InvalidRule(format!(
            "'{rule}': expected 'w <weekdays>'"
        )));
    }

    let weekdays = parse_list(tokens[1], |n| {
        (1..=7).contains(&n).then_some(n as u32)
    })
    .map_err(|part| EngineError::InvalidRule(format!("invalid weekday: '{part}'")))?;

    Ok(RecurrenceRule::Weekly { weekdays })
}

fn parse_monthly(rule: &str, tokens: &[&str]) -> Result<RecurrenceRule> {
    if tokens.len() < 2 || tokens.len() > 3 {
        return Err(EngineError::InvalidRule(format!(
            "'{rule}': expected 'm <days> [<months>]'"
        )));
    }

    let days = parse_list(tokens[1], DayMark::from_value)
        .map_err(|part| EngineError::InvalidRule(format!("invalid day: '{part}'")))?;

    let months = match tokens.get(2) {
        Some(token) => parse_list(token, |n| (1..=12).contains(&n).then_some(n as u32))
            .map_err(|part| EngineError::InvalidRule(format!("invalid month: '{part}'")))?,
        None => BTreeSet::new(),
    };

    let reachable = if months.is_empty() {
        (1..=12).any(|m| days.iter().any(|d| d.can_occur_in(m)))
    } else {
        months.iter().any(|&m| days.iter().any(|d| d.can_occur_in(m)))
    };
    if !reachable {
        return Err(EngineError::InvalidRule(format!(
            "'{rule}': no listed day occurs in any listed month"
        )));
    }

    Ok(RecurrenceRule::Monthly { days, months })
}

// ── Token helpers ───────────────────────────────────────────────────────────

fn parse_number(token: &str) -> Option<i32> {
    token.parse::<i32>().ok()
}

/// Parse a comma-separated list, mapping each number through `accept`.
///
/// On failure returns the offending list entry.
fn parse_list<T, F>(token: &str, accept: F) -> std::result::Result<BTreeSet<T>, String>
where
    T: Ord,
    F: Fn(i32) -> Option<T>,
{
    token
        .split(',')
        .map(|part| parse_number(part).and_then(&accept).ok_or_else(|| part.to_string()))
        .collect()
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(",")
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(rule: &str) {
        match RecurrenceRule::parse(rule) {
            Err(EngineError::InvalidRule(_)) => {}
            other => panic!("expected InvalidRule for {rule:?}, got {other:?}"),
        }
    }

    // ── Daily ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_daily() {
        let rule = RecurrenceRule::parse("d 3").unwrap();
        assert_eq!(rule, RecurrenceRule::Daily { interval_days: 3 });
        assert_eq!(rule.kind(), RuleKind::Daily);
    }

    #[test]
    fn test_parse_daily_bounds() {
        assert!(RecurrenceRule::parse("d 1").is_ok());
        assert!(RecurrenceRule::parse("d 400").is_ok());
        assert_invalid("d 401");
        assert_invalid("d 500");
        assert_invalid("d -1");
    }

    #[test]
    fn test_parse_daily_zero_interval_rejected() {
        assert_invalid("d 0");
    }

    #[test]
    fn test_parse_daily_malformed() {
        assert_invalid("d");
        assert_invalid("d ");
        assert_invalid("d x");
        assert_invalid("d 3 4");
        assert_invalid("d  3");
        assert_invalid("d 3.5");
    }

    // ── Yearly ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_yearly() {
        assert_eq!(RecurrenceRule::parse("y").unwrap(), RecurrenceRule::Yearly);
    }

    #[test]
    fn test_parse_yearly_rejects_trailing_content() {
        assert_invalid("y 1");
        assert_invalid("y ");
        assert_invalid("yearly");
    }

    // ── Weekly ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_weekly() {
        let rule = RecurrenceRule::parse("w 5,1,3").unwrap();
        assert_eq!(
            rule,
            RecurrenceRule::Weekly {
                weekdays: BTreeSet::from([1, 3, 5])
            }
        );
    }

    #[test]
    fn test_parse_weekly_out_of_range() {
        assert_invalid("w 0");
        assert_invalid("w 8");
        assert_invalid("w 1,8");
    }

    #[test]
    fn test_parse_weekly_malformed() {
        assert_invalid("w");
        assert_invalid("w ");
        assert_invalid("w 1,");
        assert_invalid("w 1,,2");
        assert_invalid("w mon");
        assert_invalid("w 1 2");
    }

    // ── Monthly ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_monthly_days_only() {
        let rule = RecurrenceRule::parse("m 15,-1").unwrap();
        assert_eq!(
            rule,
            RecurrenceRule::Monthly {
                days: BTreeSet::from([DayMark::Day(15), DayMark::Last]),
                months: BTreeSet::new(),
            }
        );
    }

    #[test]
    fn test_parse_monthly_with_months() {
        let rule = RecurrenceRule::parse("m -2 12,1").unwrap();
        assert_eq!(
            rule,
            RecurrenceRule::Monthly {
                days: BTreeSet::from([DayMark::SecondToLast]),
                months: BTreeSet::from([1, 12]),
            }
        );
    }

    #[test]
    fn test_parse_monthly_invalid_days() {
        assert_invalid("m 0");
        assert_invalid("m -3");
        assert_invalid("m 32");
        assert_invalid("m 1,x");
    }

    #[test]
    fn test_parse_monthly_invalid_months() {
        assert_invalid("m 1 0");
        assert_invalid("m 1 13");
        assert_invalid("m 1 1,");
    }

    #[test]
    fn test_parse_monthly_token_count() {
        assert_invalid("m");
        assert_invalid("m 1 2 3");
    }

    #[test]
    fn test_parse_monthly_unreachable_day_rejected() {
        assert_invalid("m 31 2,4");
        assert_invalid("m 30 2");
    }

    #[test]
    fn test_parse_monthly_leap_day_is_reachable() {
        assert!(RecurrenceRule::parse("m 29 2").is_ok());
        assert!(RecurrenceRule::parse("m 31 2,3").is_ok());
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_empty_rule() {
        let err = RecurrenceRule::parse("").unwrap_err();
        assert!(err.to_string().contains("rule is empty"), "got: {err}");
    }

    #[test]
    fn test_parse_unsupported_prefix() {
        assert_invalid("x 5");
        assert_invalid("D 3");
        assert_invalid(" d 3");
    }

    #[test]
    fn test_from_str() {
        let rule: RecurrenceRule = "w 7".parse().unwrap();
        assert_eq!(rule.kind(), RuleKind::Weekly);
    }

    // ── Display ─────────────────────────────────────────────────────────

    #[test]
    fn test_display_is_canonical() {
        let rule = RecurrenceRule::parse("w 3,1,3").unwrap();
        assert_eq!(rule.to_string(), "w 1,3");

        let rule = RecurrenceRule::parse("m -1,5,-2 6,1").unwrap();
        assert_eq!(rule.to_string(), "m 5,-2,-1 1,6");
    }

    #[test]
    fn test_display_reparses_to_same_rule() {
        for text in ["d 7", "y", "w 1,2,7", "m 1,-1", "m 29 2"] {
            let rule = RecurrenceRule::parse(text).unwrap();
            assert_eq!(RecurrenceRule::parse(&rule.to_string()).unwrap(), rule);
        }
    }

    #[test]
    fn test_rule_kind_serializes_lowercase() {
        let json = serde_json::to_string(&RuleKind::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
    }

    // ── DayMark ─────────────────────────────────────────────────────────

    #[test]
    fn test_day_mark_matches() {
        let feb_28 = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let feb_29 = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert!(DayMark::Last.matches(feb_29));
        assert!(!DayMark::Last.matches(feb_28));
        assert!(DayMark::SecondToLast.matches(feb_28));
        assert!(DayMark::Day(29).matches(feb_29));
    }

    #[test]
    fn test_day_mark_value_round_trip() {
        for value in [-2, -1, 1, 15, 31] {
            assert_eq!(DayMark::from_value(value).unwrap().value(), value);
        }
        assert_eq!(DayMark::from_value(0), None);
        assert_eq!(DayMark::from_value(-3), None);
        assert_eq!(DayMark::from_value(32), None);
    }
}
