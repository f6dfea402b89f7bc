//! SQLite-based task store.

use super::{StoreError, TaskStore};
use crate::task::{Task, TaskStatus};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'todo' CHECK (status IN ('todo', 'done', 'archived')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
"#;

const SELECT_COLUMNS: &str = "id, title, status, created_at, updated_at";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteTaskStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Backend(format!("Failed to create database dir: {}", e))
            })?;
        }

        let db_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| format!("Failed to open SQLite database: {}", e))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| format!("Failed to run schema: {}", e))?;
            Ok::<_, String>(conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("Task join error: {}", e)))?
        .map_err(StoreError::Backend)?;

        tracing::info!("Opened task database at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("Task join error: {}", e)))?
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_str: String = row.get(2)?;
    let status = status_str
        .parse::<TaskStatus>()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
        })?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        status,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn create(&self, id: &str, title: &str, created_at: i64) -> Result<Task, StoreError> {
        let task = Task {
            id: id.to_string(),
            title: title.to_string(),
            status: TaskStatus::Todo,
            created_at,
            updated_at: created_at,
        };

        let t = task.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, title, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![t.id, t.title, t.status.as_str(), t.created_at, t.updated_at],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    StoreError::Conflict(t.id.clone())
                }
                other => backend(other),
            })?;
            Ok(())
        })
        .await?;

        Ok(task)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                row_to_task,
            )
            .optional()
            .map_err(backend)
        })
        .await
    }

    async fn list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, StoreError> {
        self.with_conn(move |conn| {
            let tasks = match status {
                Some(status) => {
                    let mut stmt = conn
                        .prepare(&format!(
                            "SELECT {} FROM tasks WHERE status = ?1
                             ORDER BY created_at DESC, id DESC",
                            SELECT_COLUMNS
                        ))
                        .map_err(backend)?;
                    let rows = stmt
                        .query_map(params![status.as_str()], row_to_task)
                        .map_err(backend)?;
                    rows.collect::<Result<Vec<_>, _>>().map_err(backend)?
                }
                None => {
                    let mut stmt = conn
                        .prepare(&format!(
                            "SELECT {} FROM tasks ORDER BY created_at DESC, id DESC",
                            SELECT_COLUMNS
                        ))
                        .map_err(backend)?;
                    let rows = stmt.query_map([], row_to_task).map_err(backend)?;
                    rows.collect::<Result<Vec<_>, _>>().map_err(backend)?
                }
            };
            Ok(tasks)
        })
        .await
    }

    async fn update(
        &self,
        id: &str,
        title: Option<&str>,
        status: Option<TaskStatus>,
        updated_at: i64,
    ) -> Result<Task, StoreError> {
        let id = id.to_string();
        let title = title.map(|s| s.to_string());
        let status = status.map(|s| s.as_str());

        self.with_conn(move |conn| {
            let updated = conn
                .query_row(
                    &format!(
                        "UPDATE tasks
                         SET title = COALESCE(?1, title),
                             status = COALESCE(?2, status),
                             updated_at = MAX(?3, created_at)
                         WHERE id = ?4
                         RETURNING {}",
                        SELECT_COLUMNS
                    ),
                    params![title, status, updated_at, id],
                    row_to_task,
                )
                .optional()
                .map_err(backend)?;
            updated.ok_or(StoreError::NotFound(id))
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let rows = conn
                .execute("DELETE FROM tasks WHERE id = ?1", params![id])
                .map_err(backend)?;
            Ok(rows > 0)
        })
        .await
    }
}
