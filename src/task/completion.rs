//! Resolution of a free-text completion query to a single task.
//!
//! The query is either an exact task id or a case-sensitive substring of the
//! title of an open (`todo`) task. Selection is kept separate from the mutation
//! so it can be tested without a store.

use super::task::{Task, TaskCandidate, TaskError, TaskStatus};

/// Which task, if any, a completion query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionMatch {
    /// The query was an existing task id.
    ById(Task),
    /// Exactly one open task title contains the query.
    Single(Task),
    NotFound,
    /// More than one open task title contains the query.
    Ambiguous(Vec<TaskCandidate>),
}

impl CompletionMatch {
    /// The task to mark done, if the match is unambiguous.
    pub fn selected(&self) -> Option<&Task> {
        match self {
            CompletionMatch::ById(task) | CompletionMatch::Single(task) => Some(task),
            CompletionMatch::NotFound | CompletionMatch::Ambiguous(_) => None,
        }
    }
}

/// Pick the task a completion query refers to.
///
/// `by_id` is the result of looking the query up as an id; it wins over any
/// title match. `open_tasks` are searched only when the id lookup missed, and
/// tasks that are not `todo` are ignored even if passed in.
pub fn match_completion(query: &str, by_id: Option<Task>, open_tasks: &[Task]) -> CompletionMatch {
    if let Some(task) = by_id {
        return CompletionMatch::ById(task);
    }

    let mut matches: Vec<&Task> = open_tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Todo && t.title.contains(query))
        .collect();

    match matches.len() {
        0 => CompletionMatch::NotFound,
        1 => CompletionMatch::Single(matches.remove(0).clone()),
        _ => CompletionMatch::Ambiguous(matches.into_iter().map(TaskCandidate::from).collect()),
    }
}

/// Result of a complete-by-query request after any mutation has happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed(Task),
    NotFound,
    Ambiguous(Vec<TaskCandidate>),
}

impl CompletionOutcome {
    /// Fold the outcome into the service error taxonomy.
    pub fn into_result(self, query: &str) -> Result<Task, TaskError> {
        match self {
            CompletionOutcome::Completed(task) => Ok(task),
            CompletionOutcome::NotFound => {
                Err(TaskError::NotFound(format!("no task matches '{}'", query)))
            }
            CompletionOutcome::Ambiguous(candidates) => Err(TaskError::AmbiguousMatch {
                query: query.to_string(),
                candidates,
            }),
        }
    }
}
