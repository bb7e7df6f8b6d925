//! Task records and the write-time rules applied to them.
//!
//! A [`Task`] is the record a scheduler stores and serves: a date, a title, an
//! optional comment and an optional recurrence rule. Before a task is written
//! (created or updated) its date is normalized with [`normalize_task_on_write`]
//! so stored tasks never sit in the past and never carry an invalid rule.
//! When a task is marked done, [`complete_task`] decides whether it goes away
//! or moves to its next occurrence.
//!
//! Nothing here reads the clock: "today" is always passed in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::{format_date, parse_date};
use crate::error::{EngineError, Result};
use crate::next::{next_date, next_occurrence};
use crate::rule::RecurrenceRule;

/// A scheduled task as exchanged with clients.
///
/// The wire shape is `{"id":"42","date":"20240101","title":"...","comment":"...","repeat":"d 3"}`;
/// the id travels as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(
        default,
        with = "id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

/// Envelope for a list of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// What happens to a task when it is marked done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A one-off task: delete it.
    Remove,
    /// A recurring task: move it to this `YYYYMMDD` date.
    Reschedule(String),
}

// ── Normalization ───────────────────────────────────────────────────────────

/// Compute the date a task should be stored with.
///
/// # Arguments
///
/// * `title` — must be non-empty
/// * `date` — `YYYYMMDD`, or empty for "today"
/// * `rule` — recurrence rule text, or empty for a one-off task
/// * `today` — the caller's current calendar date
///
/// # Rules
///
/// - An empty date is treated as `today`, rule checks included.
/// - A date before `today` moves forward: to `today` for a one-off task, or
///   to the next occurrence after `today` for a recurring one.
/// - A date on or after `today` is kept. If a rule is present it is still run
///   through the next-occurrence search, so a bad rule is rejected now rather
///   than when the task is completed.
///
/// # Errors
///
/// Returns [`EngineError::EmptyTitle`], [`EngineError::InvalidDate`], or
/// [`EngineError::InvalidRule`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::normalize_task_on_write;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let date = normalize_task_on_write("Water plants", "20240101", "d 3", today).unwrap();
/// assert_eq!(date, "20240113");
/// ```
pub fn normalize_task_on_write(
    title: &str,
    date: &str,
    rule: &str,
    today: NaiveDate,
) -> Result<String> {
    if title.is_empty() {
        return Err(EngineError::EmptyTitle);
    }

    let current = if date.is_empty() {
        today
    } else {
        parse_date(date)?
    };

    if current < today {
        if rule.is_empty() {
            debug!(from = %date, "moving overdue one-off task to today");
            return Ok(format_date(today));
        }
        let next = next_date(today, date, rule)?;
        debug!(from = %date, to = %next, rule = %rule, "moving overdue recurring task");
        return Ok(next);
    }

    if !rule.is_empty() {
        let parsed = RecurrenceRule::parse(rule)?;
        next_occurrence(today, current, &parsed)?;
    }

    Ok(format_date(current))
}

impl Task {
    /// Normalize this task's date in place.
    ///
    /// The task is left untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// As [`normalize_task_on_write`].
    pub fn normalize(&mut self, today: NaiveDate) -> Result<()> {
        self.date = normalize_task_on_write(&self.title, &self.date, &self.repeat, today)?;
        Ok(())
    }
}

// ── Completion ──────────────────────────────────────────────────────────────

/// Decide what marking `task` as done does.
///
/// A task without a rule is removed. A recurring task moves to its next
/// occurrence strictly after its current date.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] if the stored date is malformed or
/// [`EngineError::InvalidRule`] if the stored rule is.
pub fn complete_task(task: &Task) -> Result<Completion> {
    if task.repeat.is_empty() {
        return Ok(Completion::Remove);
    }

    let current = parse_date(&task.date)?;
    let next = next_date(current, &task.date, &task.repeat)?;
    debug!(id = ?task.id, from = %task.date, to = %next, "rescheduling completed task");
    Ok(Completion::Reschedule(next))
}

// ── Serde helpers ───────────────────────────────────────────────────────────

/// `Option<i64>` carried as a JSON string. Accepts a string or a bare number
/// on input; an empty string means no id.
mod id_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(n)) => Ok(Some(n)),
            Some(Raw::Text(s)) if s.is_empty() => Ok(None),
            Some(Raw::Text(s)) => s
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid task id: '{s}'"))),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
