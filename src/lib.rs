//! # todo-app
//!
//! A small task tracker: SQLite-backed tasks with a JSON API, htmx
//! fragments for a server-rendered page, and a chat front-end that can add,
//! list and complete tasks through an LLM.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (axum)          task-agent (terminal)
//!   api::tasks           agent::TaskAgent ── llm::OpenRouterClient
//!        │                     │
//!        │               tools::ToolRegistry  (guarded allow-list)
//!        │                     │
//!        └──────► task::TaskService ◄─┘
//!                        │
//!                 store::TaskStore  (SQLite / in-memory)
//! ```
//!
//! ## Modules
//! - `store`: persistence backends
//! - `task`: task model, validation and fuzzy completion
//! - `api`: HTTP routes
//! - `llm`, `tools`, `agent`: the conversational front-end

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod store;
pub mod task;
pub mod tools;

pub use config::Config;
pub use task::{Task, TaskError, TaskService, TaskStatus};
