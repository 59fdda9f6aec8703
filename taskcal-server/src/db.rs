//! SQLite-backed task store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use taskcal_core::{Task, TaskDraft, ValidTask};
use tracing::{debug, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    due_date TEXT NOT NULL,
    time TEXT NOT NULL,
    recurrence TEXT NOT NULL DEFAULT 'none',
    completed INTEGER NOT NULL DEFAULT 0
)";

const TASK_SELECT_SQL: &str = "SELECT id, title, due_date, time, recurrence, completed FROM tasks";

/// A row as stored, before its text columns are checked.
struct TaskRow {
    id: i64,
    draft: TaskDraft,
    completed: bool,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TaskRow {
            id: row.get(0)?,
            draft: TaskDraft {
                title: row.get(1)?,
                due_date: row.get(2)?,
                time: row.get(3)?,
                recurrence: row.get(4)?,
            },
            completed: row.get::<_, i64>(5)? != 0,
        })
    }

    fn into_task(self) -> Result<Task> {
        let valid = self
            .draft
            .validate()
            .map_err(|e| anyhow::anyhow!("Stored task {} is malformed: {e}", self.id))?;
        Ok(Task::from_valid(self.id, valid, self.completed))
    }
}

/// Owns the single SQLite connection; every call holds the lock for one statement.
pub struct TaskRepo {
    conn: Mutex<Connection>,
}

impl TaskRepo {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Could not open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Could not create tasks table")?;
        Ok(TaskRepo {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Database connection lock poisoned"))
    }

    /// All tasks ordered by id. Rows that no longer parse are skipped.
    pub fn list(&self) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} ORDER BY id"))?;
        let rows = stmt
            .query_map([], TaskRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let tasks = rows
            .into_iter()
            .filter_map(|row| match row.into_task() {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!("Skipping task: {e:#}");
                    None
                }
            })
            .collect();

        Ok(tasks)
    }

    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let row = self
            .conn()?
            .query_row(
                &format!("{TASK_SELECT_SQL} WHERE id = ?1"),
                params![id],
                TaskRow::from_row,
            )
            .optional()?;

        row.map(TaskRow::into_task).transpose()
    }

    pub fn insert(&self, task: &ValidTask) -> Result<Task> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO tasks (title, due_date, time, recurrence) VALUES (?1, ?2, ?3, ?4)",
                params![
                    task.title,
                    task.due_date.format("%Y-%m-%d").to_string(),
                    task.time.to_string(),
                    task.recurrence.as_str(),
                ],
            )?;
            conn.last_insert_rowid()
        };
        debug!(id, title = %task.title, "Inserted task");

        Ok(Task::from_valid(id, task.clone(), false))
    }

    /// Replace the editable fields. Completion status is left untouched.
    pub fn update(&self, id: i64, task: &ValidTask) -> Result<Option<Task>> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET title = ?1, due_date = ?2, time = ?3, recurrence = ?4 WHERE id = ?5",
            params![
                task.title,
                task.due_date.format("%Y-%m-%d").to_string(),
                task.time.to_string(),
                task.recurrence.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn complete(&self, id: i64) -> Result<Option<Task>> {
        let changed = self
            .conn()?
            .execute("UPDATE tasks SET completed = 1 WHERE id = ?1", params![id])?;

        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    #[cfg(test)]
    fn insert_raw(&self, title: &str, due_date: &str, time: &str, recurrence: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO tasks (title, due_date, time, recurrence) VALUES (?1, ?2, ?3, ?4)",
            params![title, due_date, time, recurrence],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskcal_core::Recurrence;

    fn valid(title: &str, recurrence: &str) -> ValidTask {
        TaskDraft {
            title: title.into(),
            due_date: "2024-06-01".into(),
            time: "09:00".into(),
            recurrence: Some(recurrence.into()),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let repo = TaskRepo::open_in_memory().unwrap();

        let a = repo.insert(&valid("a", "none")).unwrap();
        let b = repo.insert(&valid("b", "daily")).unwrap();

        assert!(b.id > a.id);
        let listed = repo.list().unwrap();
        assert_eq!(listed, vec![a, b]);
    }

    #[test]
    fn update_replaces_fields_but_keeps_completion() {
        let repo = TaskRepo::open_in_memory().unwrap();
        let task = repo.insert(&valid("draft", "none")).unwrap();
        repo.complete(task.id).unwrap();

        let updated = repo.update(task.id, &valid("final", "weekly")).unwrap().unwrap();

        assert_eq!(updated.title, "final");
        assert_eq!(updated.recurrence, Recurrence::Weekly);
        assert!(updated.completed);
    }

    #[test]
    fn missing_ids_report_none_or_false() {
        let repo = TaskRepo::open_in_memory().unwrap();

        assert!(repo.get(99).unwrap().is_none());
        assert!(repo.update(99, &valid("x", "none")).unwrap().is_none());
        assert!(repo.complete(99).unwrap().is_none());
        assert!(!repo.delete(99).unwrap());
    }

    #[test]
    fn delete_removes_task() {
        let repo = TaskRepo::open_in_memory().unwrap();
        let task = repo.insert(&valid("gone", "none")).unwrap();

        assert!(repo.delete(task.id).unwrap());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn list_skips_malformed_rows() {
        let repo = TaskRepo::open_in_memory().unwrap();
        repo.insert_raw("bad date", "next tuesday", "09:00", "none").unwrap();
        repo.insert_raw("legacy", "2024-06-01", "09:00", "biweekly").unwrap();

        let tasks = repo.list().unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "legacy");
        assert_eq!(tasks[0].recurrence, Recurrence::None);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");

        let repo = TaskRepo::open(&path).unwrap();
        repo.insert(&valid("on disk", "none")).unwrap();

        assert!(path.exists());
    }
}
