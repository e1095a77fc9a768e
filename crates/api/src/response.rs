//! Response envelopes for the `/todos` resource.
//!
//! Every success body carries a human-readable `message` next to the payload.

use serde::Serialize;
use todo_core::todo::Todo;

/// `{ "message", "todo" }` for single-record responses.
#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub message: &'static str,
    pub todo: Todo,
}

/// `{ "message", "count", "todos" }` for list responses.
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub message: &'static str,
    pub count: usize,
    pub todos: Vec<Todo>,
}

/// `{ "message", "deletedTodo" }` for deletions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTodoResponse {
    pub message: &'static str,
    pub deleted_todo: Todo,
}
