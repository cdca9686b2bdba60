use axum::{extract::State, routing::get, Router};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateTaskRequest, TaskListResponse, UpdateTaskRequest},
    repo_types::Task,
    services,
};
use crate::{
    auth::extractors::AuthUser,
    extract::{ApiJson, ApiPath},
    response::{self, ApiResult},
    state::AppState,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

// AuthUser comes first in every signature so the token gate runs before
// path or body decoding.

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<TaskListResponse> {
    let tasks = services::list(&state, user_id).await?;
    response::ok(TaskListResponse { tasks })
}

#[instrument(skip(state, body))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateTaskRequest>,
) -> ApiResult<Task> {
    let task = services::create(&state, user_id, body).await?;
    response::created(task)
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Task> {
    let task = services::load_owned(&state, id, user_id).await?;
    response::ok(task)
}

#[instrument(skip(state, body))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Task> {
    let task = services::update(&state, id, user_id, body).await?;
    response::updated(task, "Task updated successfully")
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    services::delete(&state, id, user_id).await?;
    response::message("Task deleted successfully")
}
