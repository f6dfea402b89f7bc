//! HTTP API for the task tracker.
//!
//! ## Endpoints
//!
//! - `GET /` - htmx front page
//! - `GET /api/health` - Health check
//! - `GET /api/tasks` - List tasks (`?status=todo|done|archived`)
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/{id}` - Get a task
//! - `PATCH /api/tasks/{id}` - Update title and/or status
//! - `DELETE /api/tasks/{id}` - Delete a task
//! - `GET /api/tasks/htmx` - Task list as `<li>` fragments
//! - `POST /api/tasks/htmx` - Create from a form, returns one `<li>`
//! - `PATCH /api/tasks/{id}/htmx/complete` - Mark done, empty body
//! - `DELETE /api/tasks/{id}/htmx` - Delete, empty body

pub mod html;
mod routes;
pub mod tasks;
pub mod types;

pub use routes::{app, serve, AppState};
pub use types::*;
