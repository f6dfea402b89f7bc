//! Core Task type and its status vocabulary.
//!
//! # Invariants
//! - `status` is always one of `todo`, `done`, `archived`
//! - `updated_at >= created_at`
//! - `title` is never blank after a successful write

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Maximum title length, counted in characters.
pub const MAX_TITLE_CHARS: usize = 500;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
    Archived,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Done, TaskStatus::Archived];

    /// Wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
            TaskStatus::Archived => "archived",
        }
    }

    /// Human-facing label used in chat output.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "open",
            TaskStatus::Done => "done",
            TaskStatus::Archived => "archived",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TaskStatus::Todo => "⭕",
            TaskStatus::Done => "✅",
            TaskStatus::Archived => "📦",
        }
    }

    /// Comma separated list of accepted literals, for error messages.
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "done" => Ok(TaskStatus::Done),
            "archived" => Ok(TaskStatus::Archived),
            other => Err(TaskError::Validation(format!(
                "invalid status '{}', expected one of: {}",
                other,
                TaskStatus::valid_values()
            ))),
        }
    }
}

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// First 8 characters of the id, enough to tell tasks apart in chat output.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// A task offered back to the caller when a completion query is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub id: String,
    pub title: String,
}

impl From<&Task> for TaskCandidate {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
        }
    }
}

/// Errors surfaced by the task service.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("'{query}' matches {} tasks", .candidates.len())]
    AmbiguousMatch {
        query: String,
        candidates: Vec<TaskCandidate>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for TaskError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(id) => TaskError::Conflict(format!("task {} already exists", id)),
            StoreError::NotFound(id) => TaskError::NotFound(format!("task {}", id)),
            StoreError::Backend(msg) => TaskError::Storage(msg),
        }
    }
}

/// Reject blank and oversized titles.
pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::Validation("title cannot be empty".to_string()));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TaskError::Validation(format!(
            "title is {} characters, maximum is {}",
            len, MAX_TITLE_CHARS
        )));
    }
    Ok(())
}
