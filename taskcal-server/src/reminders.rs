//! Reminder scheduling and the broadcast channel behind the push endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use taskcal_core::reminder::upcoming;
use taskcal_core::{Horizon, Reminder, Task};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Reminders buffered per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    sender: broadcast::Sender<Reminder>,
    jobs: Mutex<HashMap<i64, Job>>,
    next_generation: AtomicU64,
    horizon: Horizon,
}

/// A live plan. The generation tells a finishing plan apart from its replacement.
struct Job {
    generation: u64,
    handle: JoinHandle<()>,
}

type Jobs<'a> = MutexGuard<'a, HashMap<i64, Job>>;

/// Task times carry no zone; they are read as the server's local wall clock.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl ReminderScheduler {
    pub fn new(horizon: Horizon) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        ReminderScheduler {
            inner: Arc::new(Inner {
                sender,
                jobs: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                horizon,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Reminder> {
        self.inner.sender.subscribe()
    }

    /// Plan reminders for every upcoming occurrence of `task`, replacing any
    /// earlier plan for the same task. Must be called inside a tokio runtime.
    pub fn schedule(&self, task: &Task) {
        let mut jobs = self.inner.jobs();
        self.replace(&mut jobs, task);
    }

    /// Run a store write and replan the task it returns, as one step.
    ///
    /// Plans are locked for the duration of `write`, so a concurrent
    /// [`commit_removal`](Self::commit_removal) can never be followed by a
    /// replan built from the row it removed.
    pub fn commit<F>(&self, write: F) -> Result<Option<Task>>
    where
        F: FnOnce() -> Result<Option<Task>>,
    {
        let mut jobs = self.inner.jobs();
        let task = write()?;
        if let Some(task) = &task {
            self.replace(&mut jobs, task);
        }
        Ok(task)
    }

    /// Run a store delete and drop the task's plan if it removed anything.
    pub fn commit_removal<F>(&self, task_id: i64, write: F) -> Result<bool>
    where
        F: FnOnce() -> Result<bool>,
    {
        let mut jobs = self.inner.jobs();
        let removed = write()?;
        if removed {
            Self::abort(&mut jobs, task_id);
        }
        Ok(removed)
    }

    /// Number of tasks with a live reminder plan.
    pub fn pending(&self) -> usize {
        self.inner.jobs().len()
    }

    fn replace(&self, jobs: &mut Jobs<'_>, task: &Task) {
        Self::abort(jobs, task.id);

        let plan = upcoming(task, &self.inner.horizon, now());
        let Some(first) = plan.first() else {
            return;
        };
        debug!(task_id = task.id, next = %first.start, count = plan.len(), "Scheduling reminders");

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task = task.clone();
        let task_id = task.id;

        let handle = tokio::spawn(async move {
            for occurrence in plan {
                let wait = (occurrence.start - now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let reminder = Reminder::for_occurrence(&task, &occurrence);
                info!(task_id = task.id, title = %task.title, due_at = %reminder.due_at, "Reminder due");
                // No subscribers is not an error; the reminder is simply missed.
                let _ = inner.sender.send(reminder);
            }

            let mut jobs = inner.jobs();
            if jobs.get(&task.id).is_some_and(|job| job.generation == generation) {
                jobs.remove(&task.id);
                debug!(task_id = task.id, "Reminder plan finished");
            }
        });

        if let Some(stale) = jobs.insert(task_id, Job { generation, handle }) {
            stale.handle.abort();
        }
    }

    fn abort(jobs: &mut Jobs<'_>, task_id: i64) {
        if let Some(job) = jobs.remove(&task_id) {
            job.handle.abort();
            debug!(task_id, "Cancelled reminders");
        }
    }
}

impl Inner {
    fn jobs(&self) -> Jobs<'_> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
