//! Task list search.
//!
//! A search box accepts either a date typed as `DD.MM.YYYY` or free text.
//! Dates match tasks scheduled on that day; text matches titles and comments.

use chrono::NaiveDate;

use crate::date::{format_date, parse_display_date};
use crate::task::Task;

/// Maximum number of tasks returned by one search.
pub const SEARCH_LIMIT: usize = 50;

/// A classified search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// No filter.
    All,
    /// Tasks scheduled on this day.
    Date(NaiveDate),
    /// Case-insensitive substring of the title or comment.
    Text(String),
}

impl SearchQuery {
    /// Classify raw search input.
    ///
    /// ```
    /// use recurrence_engine::search::SearchQuery;
    ///
    /// assert_eq!(SearchQuery::parse("  "), SearchQuery::All);
    /// assert!(matches!(SearchQuery::parse("08.02.2024"), SearchQuery::Date(_)));
    /// assert_eq!(SearchQuery::parse("gym"), SearchQuery::Text("gym".to_string()));
    /// ```
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return SearchQuery::All;
        }
        match parse_display_date(input) {
            Some(date) => SearchQuery::Date(date),
            None => SearchQuery::Text(input.to_string()),
        }
    }

    /// Whether `task` satisfies this query.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            SearchQuery::All => true,
            SearchQuery::Date(date) => task.date == format_date(*date),
            SearchQuery::Text(text) => {
                let needle = text.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task.comment.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Filter `tasks` by `query`, ordered by date and capped at [`SEARCH_LIMIT`].
///
/// Tasks sharing a date keep their input order.
pub fn search_tasks<'a, I>(tasks: I, query: &SearchQuery) -> Vec<Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut found: Vec<Task> = tasks
        .into_iter()
        .filter(|task| query.matches(task))
        .cloned()
        .collect();
    found.sort_by(|a, b| a.date.cmp(&b.date));
    found.truncate(SEARCH_LIMIT);
    found
}
