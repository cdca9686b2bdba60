use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateTaskRequest, UpdateTaskRequest},
    repo_types::Task,
};
use crate::{error::AppError, ownership::ensure_owner, state::AppState, store::StoreError};

fn required_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::malformed("title is required"));
    }
    Ok(title.to_string())
}

/// Strict by-id lookup, then a separate ownership check: 404 when the task
/// does not exist, 403 when it exists but belongs to someone else.
pub async fn load_owned(st: &AppState, task_id: Uuid, user_id: Uuid) -> Result<Task, AppError> {
    let task = st
        .tasks
        .find_task_by_id(task_id)
        .await?
        .ok_or(AppError::NotFound("Task not found"))?;
    ensure_owner(task.owner_id, user_id)?;
    Ok(task)
}

/// The token may outlive its account, so the owner is checked before the
/// insert and again by the store.
pub async fn create(st: &AppState, user_id: Uuid, req: CreateTaskRequest) -> Result<Task, AppError> {
    let title = required_title(&req.title)?;
    if st.users.find_user_by_id(user_id).await?.is_none() {
        warn!(%user_id, "task create for deleted account");
        return Err(AppError::NotFound("User not found"));
    }

    let task = Task::new(user_id, title, req.description, req.status);
    match st.tasks.insert_task(&task).await {
        Ok(()) => {}
        // account deleted between the check and the insert
        Err(StoreError::NotFound) => return Err(AppError::NotFound("User not found")),
        Err(e) => return Err(e.into()),
    }
    info!(task_id = %task.id, %user_id, "task created");
    Ok(task)
}

/// Only the caller's own tasks, newest first.
pub async fn list(st: &AppState, user_id: Uuid) -> Result<Vec<Task>, AppError> {
    Ok(st.tasks.find_tasks_by_owner(user_id).await?)
}

pub async fn update(
    st: &AppState,
    task_id: Uuid,
    user_id: Uuid,
    req: UpdateTaskRequest,
) -> Result<Task, AppError> {
    let mut task = load_owned(st, task_id, user_id).await?;

    if let Some(title) = req.title {
        task.title = required_title(&title)?;
    }
    if let Some(description) = req.description {
        task.description = description;
    }
    if let Some(status) = req.status {
        task.status = status;
    }
    task.updated_at = OffsetDateTime::now_utc();

    match st.tasks.update_task(&task).await {
        Ok(()) => {}
        // deleted between lookup and write
        Err(StoreError::NotFound) => return Err(AppError::NotFound("Task not found")),
        Err(e) => return Err(e.into()),
    }
    info!(%task_id, %user_id, status = %task.status, "task updated");
    Ok(task)
}

pub async fn delete(st: &AppState, task_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let task = load_owned(st, task_id, user_id).await?;
    st.tasks.delete_task(task.id).await?;
    info!(%task_id, %user_id, "task deleted");
    Ok(())
}
