//! Row type for the `todos` table.

use sqlx::FromRow;
use todo_core::todo::{Priority, Todo};
use todo_core::types::{Timestamp, TodoId};

use crate::error::StoreError;

/// A row from the `todos` table.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let priority: Priority = row.priority.parse().map_err(|_| {
            StoreError::Operation(format!(
                "todo {} has unknown priority '{}'",
                row.id, row.priority
            ))
        })?;

        Ok(Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            priority,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
