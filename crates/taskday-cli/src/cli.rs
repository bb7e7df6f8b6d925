use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Compute next occurrences of recurring tasks.
///
/// Rules: `d <days>`, `y`, `w <weekdays>`, `m <days> [<months>]`.
/// Dates are `YYYYMMDD`.
#[derive(Parser, Debug)]
#[command(name = "taskday", version, about = "Compute next occurrences of recurring tasks")]
pub struct Cli {
    /// Pin "today" to this date (YYYYMMDD) instead of the local calendar date
    #[arg(long, global = true, env = "TASKDAY_TODAY")]
    pub today: Option<String>,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the next occurrence of a rule strictly after a reference date
    Next {
        /// The task's current date (YYYYMMDD)
        #[arg(long)]
        date: String,
        /// Recurrence rule, e.g. "d 3" or "m 15,-1 1,6"
        #[arg(long)]
        repeat: String,
        /// Reference date (YYYYMMDD); defaults to today
        #[arg(long)]
        now: Option<String>,
    },
    /// Validate a rule and print its canonical form
    Rule {
        /// Recurrence rule text
        rule: String,
    },
    /// Print the date a task would be stored with
    Normalize {
        #[arg(long)]
        title: String,
        /// Task date (YYYYMMDD); empty means today
        #[arg(long, default_value = "")]
        date: String,
        /// Recurrence rule; empty means a one-off task
        #[arg(long, default_value = "")]
        repeat: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Print what marking a task as done does: its next date, or "remove"
    Done {
        /// The task's current date (YYYYMMDD)
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        repeat: String,
    },
    /// Search a task list file ({"tasks": [...]}) by DD.MM.YYYY date or text
    Search {
        /// Path to the task list JSON file
        #[arg(long)]
        file: PathBuf,
        /// Date (DD.MM.YYYY) or text; omit to list everything
        query: Option<String>,
    },
}
