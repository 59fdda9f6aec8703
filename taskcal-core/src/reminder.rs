//! Reminder planning and the reminder push payload.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{TaskCalError, TaskCalResult};
use crate::occurrence::{Horizon, Occurrence, occurrences_of};
use crate::task::{Task, TaskTime, minute_datetime};

/// Event name used on the push channel.
pub const REMINDER_EVENT: &str = "task_reminder";

/// Sent to subscribers when an occurrence of a task comes due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub task_id: i64,
    pub title: String,
    pub time: TaskTime,
    #[serde(with = "minute_datetime")]
    pub due_at: NaiveDateTime,
}

impl Reminder {
    pub fn for_occurrence(task: &Task, occurrence: &Occurrence) -> Self {
        Reminder {
            task_id: task.id,
            title: task.title.clone(),
            time: task.time,
            due_at: occurrence.start,
        }
    }

    /// Decode the `data` field of a pushed reminder event.
    pub fn from_json(data: &str) -> TaskCalResult<Self> {
        serde_json::from_str(data).map_err(|e| TaskCalError::Serialization(e.to_string()))
    }
}

/// Occurrences of `task` that start strictly after `now`, in chronological order.
///
/// Completed tasks have nothing left to remind about.
pub fn upcoming(task: &Task, horizon: &Horizon, now: NaiveDateTime) -> Vec<Occurrence> {
    if task.completed {
        return Vec::new();
    }

    occurrences_of(task, horizon)
        .filter(|occurrence| occurrence.start > now)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Recurrence;
    use chrono::NaiveDate;

    fn daily_task() -> Task {
        Task {
            id: 12,
            title: "Take vitamins".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: TaskTime::new(8, 0).unwrap(),
            recurrence: Recurrence::Daily,
            completed: false,
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn upcoming_skips_past_and_current_occurrences() {
        let plan = upcoming(&daily_task(), &Horizon::default(), at(3, 8, 0));

        assert_eq!(plan.len(), 27);
        assert_eq!(plan[0].start, at(4, 8, 0));
    }

    #[test]
    fn upcoming_includes_later_today() {
        let plan = upcoming(&daily_task(), &Horizon::default(), at(1, 7, 59));

        assert_eq!(plan.len(), 30);
        assert_eq!(plan[0].start, at(1, 8, 0));
    }

    #[test]
    fn completed_task_has_no_upcoming_reminders() {
        let mut task = daily_task();
        task.completed = true;

        assert!(upcoming(&task, &Horizon::default(), at(1, 0, 0)).is_empty());
    }

    #[test]
    fn one_time_task_in_the_past_has_nothing_upcoming() {
        let mut task = daily_task();
        task.recurrence = Recurrence::None;

        assert!(upcoming(&task, &Horizon::default(), at(2, 0, 0)).is_empty());
    }

    #[test]
    fn reminder_decodes_from_pushed_json() {
        let task = daily_task();
        let occurrence = &upcoming(&task, &Horizon::default(), at(1, 0, 0))[1];
        let reminder = Reminder::for_occurrence(&task, occurrence);

        let json = serde_json::to_string(&reminder).unwrap();
        assert!(json.contains(r#""due_at":"2024-06-02T08:00""#));
        assert_eq!(Reminder::from_json(&json).unwrap(), reminder);
    }

    #[test]
    fn malformed_reminder_payload_is_a_serialization_error() {
        let err = Reminder::from_json(r#"{"title":"x"}"#).unwrap_err();
        assert!(matches!(err, TaskCalError::Serialization(_)));
    }
}
