//! Wire DTOs for the todo API.
//!
//! These mirror the server's JSON but are defined independently so the
//! client does not depend on the server crate; the integration test catches
//! any drift between the two.

use serde::{Deserialize, Serialize};

/// A todo item as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

/// Body of `POST /v1/todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// Body of `PUT /v1/todos`.
///
/// The server always writes `completed`, so leaving it out marks the item
/// in-progress. The constructors below start from the current item so the
/// flag is carried over unless the caller means to change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Move `todo` to the given column.
    pub fn set_completed(todo: &Todo, completed: bool) -> Self {
        Self {
            id: todo.id,
            title: Some(todo.title.clone()),
            completed: Some(completed),
        }
    }

    /// Flip the completed flag.
    pub fn toggle(todo: &Todo) -> Self {
        Self::set_completed(todo, !todo.completed)
    }

    /// Rename `todo`, keeping its status. The title is trimmed first.
    pub fn rename(todo: &Todo, title: &str) -> Self {
        Self {
            id: todo.id,
            title: Some(title.trim().to_string()),
            completed: Some(todo.completed),
        }
    }
}

/// Split todos into (in-progress, completed), each keeping list order.
pub fn partition_by_status(todos: &[Todo]) -> (Vec<&Todo>, Vec<&Todo>) {
    todos.iter().partition(|todo| !todo.completed)
}
