//! Task CRUD endpoints

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
};
use taskcal_core::protocol::MessageResponse;
use taskcal_core::{Task, TaskCalError, TaskDraft};
use tracing::info;

use crate::routes::{AppError, AppJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/tasks/{id}/complete", patch(complete_task))
}

/// GET /tasks - List all tasks
async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.repo.list()?))
}

/// POST /tasks - Create a task and schedule its reminders
async fn create_task(
    State(state): State<AppState>,
    AppJson(draft): AppJson<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let valid = draft.validate()?;
    let task = state
        .reminders
        .commit(|| state.repo.insert(&valid).map(Some))?
        .context("Inserted task could not be read back")?;

    info!(id = task.id, title = %task.title, recurrence = %task.recurrence, "Task added");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/:id - Replace title, date, time and recurrence
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(draft): AppJson<TaskDraft>,
) -> Result<Json<Task>, AppError> {
    let valid = draft.validate()?;
    let task = state
        .reminders
        .commit(|| state.repo.update(id, &valid))?
        .ok_or(TaskCalError::TaskNotFound(id))?;

    info!(id, "Task updated");
    Ok(Json(task))
}

/// DELETE /tasks/:id
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.reminders.commit_removal(id, || state.repo.delete(id))? {
        return Err(TaskCalError::TaskNotFound(id).into());
    }

    info!(id, "Task deleted");
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// PATCH /tasks/:id/complete
async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, AppError> {
    let task = state
        .reminders
        .commit(|| state.repo.complete(id))?
        .ok_or(TaskCalError::TaskNotFound(id))?;

    info!(id, "Task marked as completed");
    Ok(Json(task))
}
