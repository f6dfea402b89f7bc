//! Allow-list gate for tool calls requested by the assistant.
//!
//! The model is only offered the task tools, but it can still ask for
//! anything by name. Every requested call passes through [`check_tool`]
//! before it reaches the registry.

/// Tool names the assistant may invoke.
pub const ALLOWED_TOOLS: [&str; 3] = ["add_task", "list_tasks", "complete_task"];

/// Whether `name` is on the allow-list. Exact, case-sensitive match.
pub fn is_tool_allowed(name: &str) -> bool {
    ALLOWED_TOOLS.contains(&name)
}

/// Verdict for one requested tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDecision {
    Allow,
    Deny { reason: String },
}

impl ToolDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ToolDecision::Allow)
    }
}

pub fn check_tool(name: &str) -> ToolDecision {
    if is_tool_allowed(name) {
        ToolDecision::Allow
    } else {
        ToolDecision::Deny {
            reason: format!(
                "{} is not permitted. Only task tools ({}) may be used.",
                name,
                ALLOWED_TOOLS.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_tools_are_allowed() {
        for name in ALLOWED_TOOLS {
            assert!(is_tool_allowed(name));
            assert_eq!(check_tool(name), ToolDecision::Allow);
        }
    }

    #[test]
    fn everything_else_is_denied_with_reason() {
        for name in [
            "",
            "run_command",
            "delete_task",
            "Add_Task",
            "add_task ",
            "mcp__task_manager__add_task",
        ] {
            assert!(!is_tool_allowed(name), "{:?} should be denied", name);
            match check_tool(name) {
                ToolDecision::Deny { reason } => {
                    assert!(reason.contains("not permitted"));
                    assert!(reason.contains("add_task, list_tasks, complete_task"));
                }
                ToolDecision::Allow => panic!("{:?} was allowed", name),
            }
        }
    }
}
