//! Error types for taskcal.

use thiserror::Error;

use crate::task::ValidationError;

/// Errors that can occur in taskcal operations.
#[derive(Error, Debug)]
pub enum TaskCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for taskcal operations.
pub type TaskCalResult<T> = Result<T, TaskCalError>;
