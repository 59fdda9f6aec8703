//! Core types for taskcal.
//!
//! This crate provides the types shared by taskcal-server and taskcal-cli:
//! - `task` for task records and the validation boundary in front of the store
//! - `occurrence` for expanding task records into calendar occurrences
//! - `reminder` for planning and carrying reminder notifications
//! - `config` for the user configuration file
//! - `protocol` for the small JSON envelopes used by the REST API

pub mod config;
pub mod error;
pub mod occurrence;
pub mod protocol;
pub mod reminder;
pub mod task;

pub use error::{TaskCalError, TaskCalResult};
pub use occurrence::{Category, Horizon, Occurrence, materialize, materialize_with};
pub use reminder::Reminder;
pub use task::{Recurrence, Task, TaskDraft, TaskTime, ValidTask, ValidationError};
