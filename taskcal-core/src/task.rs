//! Task records and the validation boundary in front of the store.
//!
//! A `Task` is what the store hands out: every field is already typed, so
//! anything downstream (materialization, reminders, rendering) is total.
//! A `TaskDraft` is what clients send: loose strings that must pass
//! `TaskDraft::validate` before they are written anywhere.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// How a task repeats.
///
/// Unrecognized values deserialize as `None` rather than failing, so a record
/// written by a newer or older client never makes the task list unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
        }
    }
}

impl FromStr for Recurrence {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            _ => Recurrence::None,
        })
    }
}

impl From<&str> for Recurrence {
    fn from(s: &str) -> Self {
        let Ok(recurrence) = s.parse::<Recurrence>();
        recurrence
    }
}

impl From<String> for Recurrence {
    fn from(s: String) -> Self {
        Recurrence::from(s.as_str())
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time of day with minute precision, written as `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskTime(NaiveTime);

impl TaskTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TaskTime)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TaskTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(TaskTime)
            .map_err(|_| ValidationError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TaskTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl Serialize for TaskTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A task record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub time: TaskTime,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Only ever set through the completion operation, never through an update.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn from_valid(id: i64, valid: ValidTask, completed: bool) -> Self {
        Task {
            id,
            title: valid.title,
            due_date: valid.due_date,
            time: valid.time,
            recurrence: valid.recurrence,
            completed,
        }
    }

    /// The anchor timestamp: `due_date` combined with `time`.
    pub fn start(&self) -> NaiveDateTime {
        self.due_date.and_time(self.time.as_naive())
    }
}

/// Reasons a draft cannot be written to the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: title")]
    TitleRequired,

    #[error("Missing required field: due_date")]
    DueDateRequired,

    #[error("Missing required field: time")]
    TimeRequired,

    #[error("Invalid due_date '{0}'. Expected YYYY-MM-DD")]
    InvalidDueDate(String),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),
}

/// Request body for creating or replacing a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

/// A draft that passed validation; its fields are ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub title: String,
    pub due_date: NaiveDate,
    pub time: TaskTime,
    pub recurrence: Recurrence,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<ValidTask, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }

        let due_date = self.due_date.trim();
        if due_date.is_empty() {
            return Err(ValidationError::DueDateRequired);
        }
        if self.time.trim().is_empty() {
            return Err(ValidationError::TimeRequired);
        }

        let due_date = NaiveDate::parse_from_str(due_date, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDueDate(self.due_date.clone()))?;
        let time: TaskTime = self.time.parse()?;

        let recurrence = self
            .recurrence
            .as_deref()
            .map(Recurrence::from)
            .unwrap_or_default();

        Ok(ValidTask {
            title: title.to_string(),
            due_date,
            time,
            recurrence,
        })
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        TaskDraft {
            title: task.title.clone(),
            due_date: task.due_date.format(DATE_FORMAT).to_string(),
            time: task.time.to_string(),
            recurrence: Some(task.recurrence.as_str().to_string()),
        }
    }
}

/// Serde adapter for timestamps written as `YYYY-MM-DDTHH:MM`.
pub(crate) mod minute_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, due_date: &str, time: &str, recurrence: Option<&str>) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            due_date: due_date.to_string(),
            time: time.to_string(),
            recurrence: recurrence.map(str::to_string),
        }
    }

    #[test]
    fn validate_accepts_complete_draft() {
        let valid = draft("  Standup ", "2024-03-04", "09:30", Some("weekly"))
            .validate()
            .unwrap();

        assert_eq!(valid.title, "Standup");
        assert_eq!(valid.due_date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(valid.time, TaskTime::new(9, 30).unwrap());
        assert_eq!(valid.recurrence, Recurrence::Weekly);
    }

    #[test]
    fn validate_requires_title_and_time() {
        assert_eq!(
            draft("   ", "2024-03-04", "09:30", None).validate(),
            Err(ValidationError::TitleRequired)
        );
        assert_eq!(
            draft("Standup", "2024-03-04", "", None).validate(),
            Err(ValidationError::TimeRequired)
        );
        assert_eq!(
            draft("Standup", "", "09:30", None).validate(),
            Err(ValidationError::DueDateRequired)
        );
    }

    #[test]
    fn validate_rejects_malformed_date_and_time() {
        assert_eq!(
            draft("Standup", "2024-02-30", "09:30", None).validate(),
            Err(ValidationError::InvalidDueDate("2024-02-30".into()))
        );
        assert_eq!(
            draft("Standup", "04/03/2024", "09:30", None).validate(),
            Err(ValidationError::InvalidDueDate("04/03/2024".into()))
        );
        assert_eq!(
            draft("Standup", "2024-03-04", "25:00", None).validate(),
            Err(ValidationError::InvalidTime("25:00".into()))
        );
        assert_eq!(
            draft("Standup", "2024-03-04", "half past nine", None).validate(),
            Err(ValidationError::InvalidTime("half past nine".into()))
        );
    }

    #[test]
    fn missing_or_unknown_recurrence_defaults_to_none() {
        let missing = draft("Pay rent", "2024-03-01", "08:00", None).validate().unwrap();
        assert_eq!(missing.recurrence, Recurrence::None);

        let unknown = draft("Pay rent", "2024-03-01", "08:00", Some("biweekly"))
            .validate()
            .unwrap();
        assert_eq!(unknown.recurrence, Recurrence::None);
    }

    #[test]
    fn recurrence_from_text_ignores_case_and_padding() {
        assert_eq!(Recurrence::from(" Weekly "), Recurrence::Weekly);
        assert_eq!(Recurrence::from("DAILY"), Recurrence::Daily);
        assert_eq!(Recurrence::from("monthly"), Recurrence::None);
    }

    #[test]
    fn task_deserializes_unknown_recurrence_as_none() {
        let json = r#"{"id":7,"title":"Water plants","due_date":"2024-05-01","time":"18:00","recurrence":"biweekly"}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.recurrence, Recurrence::None);
        assert!(!task.completed);
    }

    #[test]
    fn task_serializes_wire_format() {
        let task = Task {
            id: 3,
            title: "Gym".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            time: TaskTime::new(7, 5).unwrap(),
            recurrence: Recurrence::Daily,
            completed: true,
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["due_date"], "2024-01-09");
        assert_eq!(value["time"], "07:05");
        assert_eq!(value["recurrence"], "daily");
        assert_eq!(value["completed"], true);
    }

    #[test]
    fn draft_from_task_revalidates_to_same_fields() {
        let task = Task {
            id: 1,
            title: "Review".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            time: TaskTime::new(23, 59).unwrap(),
            recurrence: Recurrence::Weekly,
            completed: false,
        };

        let valid = TaskDraft::from(&task).validate().unwrap();
        assert_eq!(Task::from_valid(task.id, valid, false), task);
    }
}
