//! Conversational front-end over the task tools.
//!
//! A [`TaskAgent`] runs one user turn at a time against an LLM, restricted by
//! the [`guard`] to the three task tools. [`console`] renders the turn.

pub mod console;
pub mod guard;
mod session;

pub use console::Console;
pub use guard::{check_tool, is_tool_allowed, ToolDecision, ALLOWED_TOOLS};
pub use session::{TaskAgent, TurnEvent, TurnObserver, TurnSummary};
