//! Task tools: `add_task`, `list_tasks`, `complete_task`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use unicode_width::UnicodeWidthStr;

use super::Tool;
use crate::task::{CompletionOutcome, Task, TaskError, TaskService, TaskStatus};

fn string_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Render tasks as a fixed-width text table for the terminal.
///
/// Columns are padded by display width so wide (CJK, emoji) titles stay aligned.
pub fn format_task_table(tasks: &[Task]) -> String {
    let title_width = tasks
        .iter()
        .map(|t| t.title.width())
        .max()
        .unwrap_or(0)
        .max(20);

    let mut out = format!(
        "{:<8}  {:<title_width$}  {}\n",
        "ID",
        "Task",
        "Status",
        title_width = title_width
    );
    out.push_str(&format!(
        "{}  {}  {}\n",
        "-".repeat(8),
        "-".repeat(title_width),
        "-".repeat(12)
    ));
    for task in tasks {
        let pad = title_width - task.title.width();
        out.push_str(&format!(
            "{:<8}  {}{}  {} {}\n",
            task.short_id(),
            task.title,
            " ".repeat(pad),
            task.status.icon(),
            task.status.label()
        ));
    }
    out
}

/// Create a new task.
pub struct AddTask {
    service: Arc<TaskService>,
}

impl AddTask {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for AddTask {
    fn name(&self) -> &str {
        "add_task"
    }

    fn description(&self) -> &str {
        "Add a new task. Requires a short title."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the task, e.g. 'Buy milk'"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let Some(title) = string_arg(&args, "title") else {
            return Ok("Error: title cannot be empty".to_string());
        };

        match self.service.add(title).await {
            Ok(task) => Ok(format!("Added task: {}", task.title)),
            Err(TaskError::Validation(msg)) => Ok(format!("Error: {}", msg)),
            Err(e) => Err(e.into()),
        }
    }
}

/// List tasks, optionally filtered by status.
pub struct ListTasks {
    service: Arc<TaskService>,
}

impl ListTasks {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListTasks {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List tasks. Optionally filter by status (todo/done/archived); omit to list everything."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["todo", "done", "archived"],
                    "description": "Only list tasks with this status"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let status = match string_arg(&args, "status").map(str::parse::<TaskStatus>) {
            None => None,
            Some(Ok(status)) => Some(status),
            Some(Err(_)) => {
                return Ok(format!(
                    "Error: status must be one of {}",
                    TaskStatus::valid_values()
                ))
            }
        };

        let tasks = self.service.list_by_status(status).await?;
        if tasks.is_empty() {
            return Ok(match status {
                Some(status) => format!("No {} tasks", status.label()),
                None => "No tasks".to_string(),
            });
        }
        Ok(format_task_table(&tasks))
    }
}

/// Mark a task done by id or by part of its title.
pub struct CompleteTask {
    service: Arc<TaskService>,
}

impl CompleteTask {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for CompleteTask {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Mark a task as done. Pass the task ID or part of its title (case-sensitive)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Task ID, or a fragment of the title of an open task"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let Some(query) = string_arg(&args, "query") else {
            return Ok("Error: specify which task to complete".to_string());
        };

        match self.service.complete_by_query(query).await? {
            CompletionOutcome::Completed(task) => Ok(format!("Completed: {}", task.title)),
            CompletionOutcome::NotFound => Ok(format!("No task matches '{}'", query)),
            CompletionOutcome::Ambiguous(candidates) => {
                let names = candidates
                    .iter()
                    .map(|c| {
                        format!(
                            "- {} (ID: {})",
                            c.title,
                            c.id.chars().take(8).collect::<String>()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(format!(
                    "Several tasks match. Please be more specific:\n{}",
                    names
                ))
            }
        }
    }
}
