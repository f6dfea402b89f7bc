//! Task domain: the entity, its validation rules and the service that
//! enforces them.

mod completion;
mod service;
#[allow(clippy::module_inception)]
mod task;

pub use completion::{match_completion, CompletionMatch, CompletionOutcome};
pub use service::{unix_now, TaskService, TaskUpdate};
pub use task::{validate_title, Task, TaskCandidate, TaskError, TaskStatus, MAX_TITLE_CHARS};
