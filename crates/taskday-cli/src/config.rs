use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use recurrence_engine::parse_date;
use tracing::debug;

use crate::cli::Cli;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Settings resolved once at start-up and passed to every command.
#[derive(Debug, Clone)]
pub struct Config {
    /// The calendar date treated as "today".
    pub today: NaiveDate,
    pub output: OutputFormat,
}

impl Config {
    /// Resolve settings from parsed arguments (which already folded in the
    /// `TASKDAY_TODAY` environment variable).
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let today = match cli.today.as_deref() {
            Some(pinned) => {
                parse_date(pinned).with_context(|| format!("invalid --today value '{pinned}'"))?
            }
            None => Local::now().date_naive(),
        };
        let output = if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        debug!(%today, ?output, "resolved configuration");
        Ok(Self { today, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_pinned_today() {
        let cli = Cli::parse_from(["taskday", "--today", "20240110", "rule", "y"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_json_flag_after_subcommand() {
        let cli = Cli::parse_from(["taskday", "rule", "y", "--json", "--today", "20240110"]);
        assert_eq!(Config::from_cli(&cli).unwrap().output, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_pinned_today() {
        let cli = Cli::parse_from(["taskday", "--today", "2024-01-10", "rule", "y"]);
        let err = Config::from_cli(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("invalid --today"), "got: {err:#}");
    }
}
