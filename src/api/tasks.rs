//! Task endpoints: JSON resources plus htmx fragments.
//!
//! Fixed `/htmx` paths are registered ahead of the `/:id` routes so that a
//! literal `htmx` segment is never taken for an id.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, patch},
    Form, Json, Router,
};

use super::html::{render_task_item, render_task_list};
use super::routes::AppState;
use super::types::{
    CreateTaskForm, CreateTaskRequest, ListQuery, TaskListResponse, UpdateTaskRequest,
};
use crate::task::{Task, TaskError, TaskUpdate};

type ApiError = (StatusCode, String);

/// Create task routes, mounted at `/api/tasks`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/htmx", get(list_tasks_htmx).post(create_task_htmx))
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/:id/htmx/complete", patch(complete_task_htmx))
        .route("/:id/htmx", axum::routing::delete(delete_task_htmx))
}

/// Map a service error to a status code and plain-text body.
pub fn map_task_error(err: TaskError) -> ApiError {
    let status = match &err {
        TaskError::Validation(_) => StatusCode::BAD_REQUEST,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::AmbiguousMatch { .. } => StatusCode::CONFLICT,
        TaskError::Conflict(_) | TaskError::Storage(_) => {
            tracing::error!("Task request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/tasks - List tasks, optionally `?status=`.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = state
        .service
        .list(query.status())
        .await
        .map_err(map_task_error)?;
    Ok(Json(tasks.into()))
}

/// GET /api/tasks/:id
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.service.require(&id).await.map_err(map_task_error)?;
    Ok(Json(task))
}

/// POST /api/tasks
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.service.add(&req.title).await.map_err(map_task_error)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/tasks/:id
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let update = TaskUpdate {
        title: req.title,
        status: req.status,
    };
    let task = state
        .service
        .update(&id, update)
        .await
        .map_err(map_task_error)?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(&id).await.map_err(map_task_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// htmx fragments
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/tasks/htmx - `<li>` per task, or the empty placeholder.
async fn list_tasks_htmx(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, ApiError> {
    let tasks = state
        .service
        .list(query.status())
        .await
        .map_err(map_task_error)?;
    Ok(Html(render_task_list(&tasks)))
}

/// POST /api/tasks/htmx - Form-encoded `title`; returns the new `<li>`.
async fn create_task_htmx(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateTaskForm>,
) -> Result<Html<String>, ApiError> {
    let task = state.service.add(&form.title).await.map_err(map_task_error)?;
    Ok(Html(render_task_item(&task)))
}

/// PATCH /api/tasks/:id/htmx/complete - Empty body so the item is swapped out.
///
/// 200 rather than 204: htmx skips the `outerHTML` swap on a 204 response.
async fn complete_task_htmx(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    state.service.complete(&id).await.map_err(map_task_error)?;
    Ok(Html(String::new()))
}

/// DELETE /api/tasks/:id/htmx - 200 with an empty body, for the same reason.
async fn delete_task_htmx(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    state.service.delete(&id).await.map_err(map_task_error)?;
    Ok(Html(String::new()))
}
