use std::sync::Arc;

use anyhow::Result;
use taskcal_core::config::TaskcalConfig;
use taskcal_core::Horizon;
use tracing::info;

use crate::db::TaskRepo;
use crate::reminders::ReminderScheduler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<TaskRepo>,
    pub reminders: ReminderScheduler,
}

impl AppState {
    pub fn open(config: &TaskcalConfig) -> Result<Self> {
        let path = config.database_path();
        info!(path = %path.display(), "Opening task database");
        let repo = TaskRepo::open(&path)?;
        Ok(Self::with_repo(repo, config.horizon()))
    }

    pub fn with_repo(repo: TaskRepo, horizon: Horizon) -> Self {
        AppState {
            repo: Arc::new(repo),
            reminders: ReminderScheduler::new(horizon),
        }
    }

    /// Plan reminders for every stored task, e.g. after a restart.
    pub fn schedule_all(&self) -> Result<()> {
        let tasks = self.repo.list()?;
        for task in &tasks {
            self.reminders.schedule(task);
        }
        info!(
            tasks = tasks.len(),
            scheduled = self.reminders.pending(),
            "Reminders scheduled"
        );
        Ok(())
    }
}
