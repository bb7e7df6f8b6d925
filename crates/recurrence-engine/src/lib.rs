//! # recurrence-engine
//!
//! Deterministic next-occurrence computation for recurring tasks.
//!
//! Given a reference date, a task's current date and a compact rule such as
//! `d 3`, `y`, `w 1,3,5` or `m 15,-1 1,6`, the engine computes the earliest
//! qualifying calendar date strictly after the reference. All functions are
//! pure: no clock, no I/O, no shared state.
//!
//! ## Modules
//!
//! - [`rule`] — rule text → [`RecurrenceRule`]
//! - [`date`] — `YYYYMMDD` codec and calendar arithmetic
//! - [`next`] — next-occurrence search per rule kind
//! - [`task`] — task records, write-time normalization, completion
//! - [`search`] — task list search queries
//! - [`error`] — Error types

pub mod date;
pub mod error;
pub mod next;
pub mod rule;
pub mod search;
pub mod task;

pub use date::{format_date, parse_date};
pub use error::{EngineError, Result};
pub use next::{compute_next_occurrence, next_date, next_occurrence};
pub use rule::{DayMark, RecurrenceRule, RuleKind};
pub use search::{search_tasks, SearchQuery, SEARCH_LIMIT};
pub use task::{complete_task, normalize_task_on_write, Completion, Task, TaskList};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_sync() {
        assert_send_sync::<RecurrenceRule>();
        assert_send_sync::<DayMark>();
        assert_send_sync::<RuleKind>();
        assert_send_sync::<Task>();
        assert_send_sync::<TaskList>();
        assert_send_sync::<Completion>();
        assert_send_sync::<SearchQuery>();
        assert_send_sync::<EngineError>();
    }
}
