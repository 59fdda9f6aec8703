use anyhow::{Context, Result};
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use taskcal_core::{Recurrence, Task, TaskDraft};

use crate::client::Client;

/// Field overrides given on the command line; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct Changes {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub recurrence: Option<Recurrence>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.time.is_none() && self.recurrence.is_none()
    }

    fn apply(self, task: &Task) -> TaskDraft {
        let mut draft = TaskDraft::from(task);
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(date) = self.date {
            draft.due_date = date.format("%Y-%m-%d").to_string();
        }
        if let Some(time) = self.time {
            draft.time = time;
        }
        if let Some(recurrence) = self.recurrence {
            draft.recurrence = Some(recurrence.as_str().to_string());
        }
        draft
    }
}

pub async fn run(client: &Client, id: i64, changes: Changes) -> Result<()> {
    if changes.is_empty() {
        anyhow::bail!("Nothing to change. Pass --title, --date, --time or --recurrence");
    }

    let tasks = client.list_tasks().await?;
    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .with_context(|| format!("Task not found: {id}"))?;

    let draft = changes.apply(task);
    draft.validate()?;

    let updated = client.update_task(id, &draft).await?;
    println!(
        "{}",
        format!(
            "  Updated #{}: {} on {} at {} ({})",
            updated.id, updated.title, updated.due_date, updated.time, updated.recurrence
        )
        .green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskcal_core::TaskTime;

    fn task() -> Task {
        Task {
            id: 3,
            title: "Water plants".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: TaskTime::new(8, 0).unwrap(),
            recurrence: Recurrence::Daily,
            completed: false,
        }
    }

    #[test]
    fn unchanged_fields_keep_stored_values() {
        let changes = Changes {
            time: Some("19:30".into()),
            ..Changes::default()
        };

        let valid = changes.apply(&task()).validate().unwrap();

        assert_eq!(valid.title, "Water plants");
        assert_eq!(valid.due_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(valid.time, TaskTime::new(19, 30).unwrap());
        assert_eq!(valid.recurrence, Recurrence::Daily);
    }

    #[test]
    fn overrides_replace_every_field() {
        let changes = Changes {
            title: Some("Repot cactus".into()),
            date: NaiveDate::from_ymd_opt(2024, 7, 4),
            time: Some("10:00".into()),
            recurrence: Some(Recurrence::None),
        };

        let valid = changes.apply(&task()).validate().unwrap();

        assert_eq!(valid.title, "Repot cactus");
        assert_eq!(valid.due_date, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        assert_eq!(valid.recurrence, Recurrence::None);
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(Changes::default().is_empty());
    }
}
