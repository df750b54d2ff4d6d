/// Task endpoints
///
/// Every handler acts on behalf of the session's user; task ids owned by
/// someone else answer 403.
///
/// # Endpoints
///
/// ```text
/// GET    /v1/tasks?completed=&priority=
/// POST   /v1/tasks
/// GET    /v1/tasks/stats
/// GET    /v1/tasks/:id
/// PATCH  /v1/tasks/:id
/// DELETE /v1/tasks/:id
/// POST   /v1/tasks/:id/toggle
/// ```
///
/// # Create request
///
/// ```json
/// {
///   "title": "Write report",
///   "description": "Q3 numbers",
///   "priority": "high",
///   "due_date": 1767225600000
/// }
/// ```
///
/// # Create response (201)
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "task": { "id": "...", "title": "Write report", "completed": false, ... }
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::middleware::SessionContext;
use taskboard_shared::models::task::{NewTask, Priority, Task, TaskFilter, TaskPatch, TaskStats};
use uuid::Uuid;

/// Query string for listing and streaming
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    /// Only tasks with this completion flag
    pub completed: Option<bool>,

    /// Only tasks with this priority
    pub priority: Option<Priority>,
}

impl From<ListQuery> for TaskFilter {
    fn from(query: ListQuery) -> Self {
        TaskFilter {
            completed: query.completed,
            priority: query.priority,
        }
    }
}

/// Task list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Matching tasks, newest first
    pub tasks: Vec<Task>,

    /// Number of tasks returned
    pub count: usize,
}

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    /// Id of the new task
    pub id: Uuid,

    /// Stored record
    pub task: Task,
}

/// Lists the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<TaskListResponse>> {
    let Query(query) = query?;
    let tasks = state.tasks.list(&session.user_id, query.into()).await?;

    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

/// Creates a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let Json(input) = payload?;
    let task = state.tasks.create(&session.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse { id: task.id, task }),
    ))
}

/// Dashboard counters
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<TaskStats>> {
    let stats = state.tasks.stats(&session.user_id).await?;
    Ok(Json(stats))
}

/// Fetches one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.get(&session.user_id, parse_id(&id)?).await?;
    Ok(Json(task))
}

/// Applies a partial update
pub async fn patch_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;

    let task = state.tasks.patch(&session.user_id, id, patch).await?;
    Ok(Json(task))
}

/// Flips the completion flag
pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state
        .tasks
        .toggle_completion(&session.user_id, parse_id(&id)?)
        .await?;
    Ok(Json(task))
}

/// Deletes a task; 204 whether or not it still existed
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(&session.user_id, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid task id: {}", raw)))
}
