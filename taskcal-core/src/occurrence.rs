//! Expansion of task records into calendar occurrences.
//!
//! Occurrences are never stored. Every time the task list changes the whole
//! list is materialized again and the result replaces what the calendar shows.

use chrono::{Days, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::task::{Recurrence, Task, minute_datetime};

pub const DEFAULT_DAILY_HORIZON_DAYS: u32 = 30;
pub const DEFAULT_WEEKLY_HORIZON_WEEKS: u32 = 8;

/// Visual category of an occurrence, derived one-to-one from the task's recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Daily,
    Weekly,
    None,
}

impl From<Recurrence> for Category {
    fn from(recurrence: Recurrence) -> Self {
        match recurrence {
            Recurrence::Daily => Category::Daily,
            Recurrence::Weekly => Category::Weekly,
            Recurrence::None => Category::None,
        }
    }
}

/// How far ahead recurring tasks are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub daily_days: u32,
    pub weekly_weeks: u32,
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon {
            daily_days: DEFAULT_DAILY_HORIZON_DAYS,
            weekly_weeks: DEFAULT_WEEKLY_HORIZON_WEEKS,
        }
    }
}

impl Horizon {
    /// Number of occurrences and the day step between them.
    fn cadence(&self, recurrence: Recurrence) -> (u32, u64) {
        match recurrence {
            Recurrence::Daily => (self.daily_days, 1),
            Recurrence::Weekly => (self.weekly_weeks, 7),
            Recurrence::None => (1, 0),
        }
    }
}

/// One concrete calendar instance of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub task_id: i64,
    pub title: String,
    pub category: Category,
    #[serde(with = "minute_datetime")]
    pub start: NaiveDateTime,
}

/// Expand every task with the default horizon.
pub fn materialize(tasks: &[Task]) -> Vec<Occurrence> {
    materialize_with(tasks, &Horizon::default())
}

/// Expand every task, in input order, then chronologically within each task.
pub fn materialize_with(tasks: &[Task], horizon: &Horizon) -> Vec<Occurrence> {
    tasks
        .iter()
        .flat_map(|task| occurrences_of(task, horizon))
        .collect()
}

/// Occurrences of a single task in chronological order.
///
/// Dates advance by calendar days, so month ends, leap days and DST changes
/// never shift the time of day. Steps past the last representable date are dropped.
pub fn occurrences_of(task: &Task, horizon: &Horizon) -> impl Iterator<Item = Occurrence> {
    let (count, step) = horizon.cadence(task.recurrence);
    let category = Category::from(task.recurrence);

    (0..u64::from(count)).filter_map(move |i| {
        let date = task.due_date.checked_add_days(Days::new(i * step))?;
        Some(Occurrence {
            task_id: task.id,
            title: task.title.clone(),
            category,
            start: date.and_time(task.time.as_naive()),
        })
    })
}
