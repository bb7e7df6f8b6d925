use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use recurrence_engine::{
    complete_task, format_date, next_date, parse_date, search_tasks, Completion, RecurrenceRule,
    RuleKind, SearchQuery, Task, TaskList,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::cli::Commands;
use crate::config::{Config, OutputFormat};

#[derive(Serialize)]
struct RuleSummary {
    kind: RuleKind,
    rule: String,
}

/// Execute one command and return what should be printed on stdout.
pub fn run(command: &Commands, config: &Config) -> Result<String> {
    match command {
        Commands::Next { date, repeat, now } => next(config, date, repeat, now.as_deref()),
        Commands::Rule { rule } => rule_summary(config, rule),
        Commands::Normalize {
            title,
            date,
            repeat,
            comment,
        } => normalize(config, title, date, repeat, comment),
        Commands::Done { date, repeat } => done(config, date, repeat),
        Commands::Search { file, query } => search(config, file, query.as_deref().unwrap_or("")),
    }
}

fn next(config: &Config, date: &str, repeat: &str, now: Option<&str>) -> Result<String> {
    let reference = match now {
        Some(now) => parse_date(now).with_context(|| format!("invalid --now value '{now}'"))?,
        None => config.today,
    };
    debug!(reference = %format_date(reference), date, repeat, "computing next date");

    let next = next_date(reference, date, repeat)?;
    Ok(match config.output {
        OutputFormat::Text => next,
        OutputFormat::Json => json!({ "next_date": next }).to_string(),
    })
}

fn rule_summary(config: &Config, text: &str) -> Result<String> {
    let rule = RecurrenceRule::parse(text)?;
    Ok(match config.output {
        OutputFormat::Text => format!("{}: {}", rule.kind(), rule),
        OutputFormat::Json => serde_json::to_string(&RuleSummary {
            kind: rule.kind(),
            rule: rule.to_string(),
        })?,
    })
}

fn normalize(
    config: &Config,
    title: &str,
    date: &str,
    repeat: &str,
    comment: &str,
) -> Result<String> {
    let mut task = Task {
        id: None,
        date: date.to_string(),
        title: title.to_string(),
        comment: comment.to_string(),
        repeat: repeat.to_string(),
    };
    task.normalize(config.today)?;
    if task.date != date {
        info!(from = %date, to = %task.date, "task date normalized");
    }

    Ok(match config.output {
        OutputFormat::Text => task.date,
        OutputFormat::Json => serde_json::to_string(&task)?,
    })
}

fn done(config: &Config, date: &str, repeat: &str) -> Result<String> {
    let task = Task {
        date: date.to_string(),
        repeat: repeat.to_string(),
        ..Default::default()
    };

    let completion = complete_task(&task)?;
    Ok(match (config.output, completion) {
        (OutputFormat::Text, Completion::Remove) => "remove".to_string(),
        (OutputFormat::Text, Completion::Reschedule(next)) => next,
        (OutputFormat::Json, Completion::Remove) => json!({ "action": "remove" }).to_string(),
        (OutputFormat::Json, Completion::Reschedule(next)) => {
            json!({ "action": "reschedule", "date": next }).to_string()
        }
    })
}

fn search(config: &Config, file: &Path, query: &str) -> Result<String> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read task list {}", file.display()))?;
    let list: TaskList = serde_json::from_str(&raw)
        .with_context(|| format!("failed to decode task list {}", file.display()))?;

    let query = SearchQuery::parse(query);
    let tasks = search_tasks(&list.tasks, &query);
    debug!(?query, total = list.tasks.len(), found = tasks.len(), "searched tasks");

    Ok(match config.output {
        OutputFormat::Text => tasks
            .iter()
            .map(format_task_line)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string(&TaskList { tasks })?,
    })
}

fn format_task_line(task: &Task) -> String {
    let mut line = format!("{}  {}", task.date, task.title);
    if !task.repeat.is_empty() {
        line.push_str(&format!("  [{}]", task.repeat));
    }
    line
}
