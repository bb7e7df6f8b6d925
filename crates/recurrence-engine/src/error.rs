//! Error types for recurrence-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Task title is required")]
    EmptyTitle,
}

pub type Result<T> = std::result::Result<T, EngineError>;
