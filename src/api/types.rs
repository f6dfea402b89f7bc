//! API request/response types.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Missing titles deserialize as empty and fail validation.
    #[serde(default)]
    pub title: String,
}

/// Body of `PATCH /api/tasks/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,

    /// Status literal (`todo`, `done`, `archived`)
    #[serde(default)]
    pub status: Option<String>,
}

/// Query string of the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

impl ListQuery {
    /// `?status=` with an empty value means no filter.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

/// Form body of `POST /api/tasks/htmx`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskForm {
    #[serde(default)]
    pub title: String,
}

/// Response of `GET /api/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl From<Vec<Task>> for TaskListResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            count: tasks.len(),
            tasks,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
