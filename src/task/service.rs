//! Domain rules on top of a [`TaskStore`].
//!
//! The service owns id generation and timestamps; the store only persists
//! what it is given.

use std::sync::{Arc, Mutex};

use ulid::Generator;

use super::completion::{match_completion, CompletionMatch, CompletionOutcome};
use super::task::{validate_title, Task, TaskError, TaskStatus};
use crate::store::TaskStore;

/// Seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Fields accepted by [`TaskService::update`].
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    /// Raw status literal, validated by the service.
    pub status: Option<String>,
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    ids: Mutex<Generator>,
    clock: fn() -> i64,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_clock(store, unix_now)
    }

    /// Use a custom clock (tests).
    pub fn with_clock(store: Arc<dyn TaskStore>, clock: fn() -> i64) -> Self {
        Self {
            store,
            ids: Mutex::new(Generator::new()),
            clock,
        }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Monotonic ULID, so ids sort in creation order within this process.
    fn next_id(&self) -> Result<String, TaskError> {
        let mut ids = self
            .ids
            .lock()
            .map_err(|_| TaskError::Storage("id generator lock poisoned".to_string()))?;
        ids.generate()
            .map(|id| id.to_string())
            .map_err(|e| TaskError::Storage(format!("id generation failed: {}", e)))
    }

    /// Create a new `todo` task.
    pub async fn add(&self, title: &str) -> Result<Task, TaskError> {
        validate_title(title)?;
        let id = self.next_id()?;
        let now = (self.clock)();
        let task = self.store.create(&id, title, now).await?;
        tracing::info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Task>, TaskError> {
        Ok(self.store.get(id).await?)
    }

    /// Like [`get`](Self::get) but a missing id is an error.
    pub async fn require(&self, id: &str) -> Result<Task, TaskError> {
        self.get(id)
            .await?
            .ok_or_else(|| TaskError::NotFound(format!("task {}", id)))
    }

    /// List tasks, optionally filtered by a status literal.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Task>, TaskError> {
        let status = status.map(str::parse::<TaskStatus>).transpose()?;
        self.list_by_status(status).await
    }

    pub async fn list_by_status(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list(status).await?)
    }

    /// Partial update of title and/or status.
    pub async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task, TaskError> {
        if let Some(ref title) = update.title {
            validate_title(title)?;
        }
        let status = update
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?;

        self.require(id).await?;
        let task = self
            .store
            .update(id, update.title.as_deref(), status, (self.clock)())
            .await?;
        tracing::info!(task_id = %task.id, status = %task.status, "Updated task");
        Ok(task)
    }

    /// Mark an existing task done.
    pub async fn complete(&self, id: &str) -> Result<Task, TaskError> {
        self.require(id).await?;
        self.mark_done(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), TaskError> {
        if !self.store.delete(id).await? {
            return Err(TaskError::NotFound(format!("task {}", id)));
        }
        tracing::info!(task_id = %id, "Deleted task");
        Ok(())
    }

    /// Complete the task a free-text query refers to.
    ///
    /// The query is tried as an exact id first, then as a case-sensitive
    /// substring of open task titles. Ambiguous queries mutate nothing.
    pub async fn complete_by_query(&self, query: &str) -> Result<CompletionOutcome, TaskError> {
        if query.trim().is_empty() {
            return Err(TaskError::Validation("query cannot be empty".to_string()));
        }

        let by_id = self.store.get(query).await?;
        let open = if by_id.is_some() {
            Vec::new()
        } else {
            self.store.list(Some(TaskStatus::Todo)).await?
        };

        match match_completion(query, by_id, &open) {
            CompletionMatch::ById(task) | CompletionMatch::Single(task) => {
                let done = self.mark_done(&task.id).await?;
                Ok(CompletionOutcome::Completed(done))
            }
            CompletionMatch::NotFound => Ok(CompletionOutcome::NotFound),
            CompletionMatch::Ambiguous(candidates) => {
                tracing::debug!(
                    query,
                    candidates = candidates.len(),
                    "Completion query is ambiguous"
                );
                Ok(CompletionOutcome::Ambiguous(candidates))
            }
        }
    }

    async fn mark_done(&self, id: &str) -> Result<Task, TaskError> {
        let task = self
            .store
            .update(id, None, Some(TaskStatus::Done), (self.clock)())
            .await?;
        tracing::info!(task_id = %task.id, "Completed task");
        Ok(task)
    }
}
