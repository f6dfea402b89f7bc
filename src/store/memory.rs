//! In-memory task store (non-persistent).

use super::{sort_newest_first, StoreError, TaskStore};
use crate::task::{Task, TaskStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn create(&self, id: &str, title: &str, created_at: i64) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(id) {
            return Err(StoreError::Conflict(id.to_string()));
        }
        let task = Task {
            id: id.to_string(),
            title: title.to_string(),
            status: TaskStatus::Todo,
            created_at,
            updated_at: created_at,
        };
        tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn update(
        &self,
        id: &str,
        title: Option<&str>,
        status: Option<TaskStatus>,
        updated_at: i64,
    ) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Some(title) = title {
            task.title = title.to_string();
        }
        if let Some(status) = status {
            task.status = status;
        }
        task.updated_at = updated_at.max(task.created_at);
        Ok(task.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }
}
