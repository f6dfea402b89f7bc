//! Task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database in WAL mode

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::task::{Task, TaskStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task {0} already exists")]
    Conflict(String),

    #[error("Task {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

/// Task store trait - implemented by all storage backends.
///
/// Every method is a single atomic operation; there are no multi-row
/// transactions.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Insert a new `todo` task with `updated_at = created_at`.
    async fn create(&self, id: &str, title: &str, created_at: i64) -> Result<Task, StoreError>;

    /// Point lookup. A missing id is `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// All tasks, or those with `status`, ordered by `created_at` descending.
    async fn list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, StoreError>;

    /// Partial update. Only supplied fields change; `updated_at` always does.
    async fn update(
        &self,
        id: &str,
        title: Option<&str>,
        status: Option<TaskStatus>,
        updated_at: i64,
    ) -> Result<Task, StoreError>;

    /// Remove a task. Returns whether a row was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Newest first; ids break ties so ordering is stable within one second.
pub(crate) fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Both backends must honor the same contract.
    async fn backends() -> (Vec<Arc<dyn TaskStore>>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let sqlite = SqliteTaskStore::new(dir.path().join("tasks.db"))
            .await
            .expect("open sqlite store");
        (
            vec![Arc::new(InMemoryTaskStore::new()), Arc::new(sqlite)],
            dir,
        )
    }

    #[tokio::test]
    async fn create_then_get_returns_todo_task() {
        let (stores, _dir) = backends().await;
        for store in stores {
            let created = store.create("01A", "Buy milk", 100).await.unwrap();
            assert_eq!(created.status, TaskStatus::Todo);
            assert_eq!(created.created_at, 100);
            assert_eq!(created.updated_at, 100);

            let fetched = store.get("01A").await.unwrap().expect("task exists");
            assert_eq!(fetched, created);
        }
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let (stores, _dir) = backends().await;
        for store in stores {
            store.create("01A", "first", 1).await.unwrap();
            let err = store.create("01A", "second", 2).await.unwrap_err();
            assert!(matches!(err, StoreError::Conflict(_)), "{:?}", err);
            assert_eq!(store.get("01A").await.unwrap().unwrap().title, "first");
        }
    }

    #[tokio::test]
    async fn missing_id_is_absent_not_error() {
        let (stores, _dir) = backends().await;
        for store in stores {
            assert!(store.get("nope").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn list_filters_by_status_newest_first() {
        let (stores, _dir) = backends().await;
        for store in stores {
            store.create("01A", "oldest", 10).await.unwrap();
            store.create("01B", "middle", 20).await.unwrap();
            store.create("01C", "newest", 30).await.unwrap();
            store
                .update("01A", None, Some(TaskStatus::Done), 40)
                .await
                .unwrap();
            store
                .update("01C", None, Some(TaskStatus::Done), 41)
                .await
                .unwrap();

            let all: Vec<_> = store
                .list(None)
                .await
                .unwrap()
                .into_iter()
                .map(|t| t.id)
                .collect();
            assert_eq!(all, vec!["01C", "01B", "01A"]);

            let done = store.list(Some(TaskStatus::Done)).await.unwrap();
            assert!(done.iter().all(|t| t.status == TaskStatus::Done));
            let ids: Vec<_> = done.into_iter().map(|t| t.id).collect();
            assert_eq!(ids, vec!["01C", "01A"]);

            assert!(store
                .list(Some(TaskStatus::Archived))
                .await
                .unwrap()
                .is_empty());
        }
    }

    #[tokio::test]
    async fn same_second_ties_break_on_id() {
        let (stores, _dir) = backends().await;
        for store in stores {
            store.create("01A", "a", 5).await.unwrap();
            store.create("01B", "b", 5).await.unwrap();
            let ids: Vec<_> = store
                .list(None)
                .await
                .unwrap()
                .into_iter()
                .map(|t| t.id)
                .collect();
            assert_eq!(ids, vec!["01B", "01A"]);
        }
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (stores, _dir) = backends().await;
        for store in stores {
            store.create("01A", "Buy milk", 100).await.unwrap();

            let archived = store
                .update("01A", None, Some(TaskStatus::Archived), 200)
                .await
                .unwrap();
            assert_eq!(archived.title, "Buy milk");
            assert_eq!(archived.status, TaskStatus::Archived);
            assert_eq!(archived.created_at, 100);
            assert_eq!(archived.updated_at, 200);

            let renamed = store
                .update("01A", Some("Buy oat milk"), None, 300)
                .await
                .unwrap();
            assert_eq!(renamed.title, "Buy oat milk");
            assert_eq!(renamed.status, TaskStatus::Archived);
            assert_eq!(renamed.updated_at, 300);
        }
    }

    #[tokio::test]
    async fn update_never_moves_updated_at_before_created_at() {
        let (stores, _dir) = backends().await;
        for store in stores {
            store.create("01A", "t", 100).await.unwrap();
            let task = store.update("01A", Some("u"), None, 50).await.unwrap();
            assert_eq!(task.updated_at, 100);
        }
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (stores, _dir) = backends().await;
        for store in stores {
            let err = store.update("nope", Some("x"), None, 1).await.unwrap_err();
            assert!(matches!(err, StoreError::NotFound(_)), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn delete_is_idempotent_from_the_caller_side() {
        let (stores, _dir) = backends().await;
        for store in stores {
            store.create("01A", "t", 1).await.unwrap();
            assert!(store.delete("01A").await.unwrap());
            assert!(store.get("01A").await.unwrap().is_none());
            assert!(!store.delete("01A").await.unwrap());
        }
    }
}
