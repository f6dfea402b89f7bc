//! Tool system for the chat front-end.
//!
//! Tools are the only way the assistant can touch task data. Each tool wraps a
//! [`TaskService`](crate::task::TaskService) operation and reports back in
//! plain text, including failures, so the model can relay them to the user.

mod task_tools;

pub use task_tools::{format_task_table, AddTask, CompleteTask, ListTasks};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::task::TaskService;

/// Information about a tool for display purposes.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// The three task tools backed by `service`.
    pub fn for_tasks(service: Arc<TaskService>) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(AddTask::new(Arc::clone(&service))));
        registry.register(Arc::new(ListTasks::new(Arc::clone(&service))));
        registry.register(Arc::new(CompleteTask::new(service)));
        tracing::debug!(
            "Task tool registry ready with {} tools",
            registry.tools.len()
        );
        registry
    }

    /// Add or replace a tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// List all available tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get tool schemas in LLM-compatible format, sorted by name.
    pub fn get_tool_schemas(&self) -> Vec<ToolDefinition> {
        let mut schemas: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect();
        schemas.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        schemas
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;

        tool.execute(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;

    fn registry() -> ToolRegistry {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        ToolRegistry::for_tasks(service)
    }

    #[test]
    fn exposes_exactly_the_three_task_tools() {
        let names: Vec<_> = registry()
            .get_tool_schemas()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, vec!["add_task", "complete_task", "list_tasks"]);
    }

    #[test]
    fn schemas_are_function_objects() {
        for def in registry().get_tool_schemas() {
            assert_eq!(def.tool_type, "function");
            assert_eq!(def.function.parameters["type"], "object");
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let err = registry()
            .execute("delete_everything", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }
}
