//! Repository for the `todos` table.

use sqlx::PgPool;
use todo_core::listing::{ListQuery, SortField, SortOrder};
use todo_core::todo::{NewTodo, Todo};
use todo_core::types::TodoId;

use crate::models::todo::TodoRow;

/// Column list for `todos` queries.
const COLUMNS: &str = "id, title, description, priority, due_date, created_at, updated_at";

/// Provides data access for todos.
pub struct TodoRepo;

impl TodoRepo {
    /// List todos, optionally filtered by priority.
    ///
    /// Null due dates sort last in both directions; ties break by id.
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<TodoRow>, sqlx::Error> {
        let sql = list_sql(query);
        let mut q = sqlx::query_as::<_, TodoRow>(&sql);
        if let Some(priority) = query.priority {
            q = q.bind(priority.as_str());
        }
        q.fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: TodoId) -> Result<Option<TodoRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM todos WHERE id = $1");
        sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new todo. The id comes from the column default.
    pub async fn create(pool: &PgPool, dto: &NewTodo) -> Result<TodoRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (title, description, priority, due_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TodoRow>(&query)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(dto.priority.as_str())
            .bind(dto.due_date)
            .bind(dto.created_at)
            .bind(dto.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Overwrite every mutable column. `created_at` is left untouched.
    pub async fn update(pool: &PgPool, todo: &Todo) -> Result<Option<TodoRow>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET \
                 title = $2, description = $3, priority = $4, \
                 due_date = $5, updated_at = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TodoRow>(&query)
            .bind(todo.id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.priority.as_str())
            .bind(todo.due_date)
            .bind(todo.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete a todo and return the deleted row.
    pub async fn delete(pool: &PgPool, id: TodoId) -> Result<Option<TodoRow>, sqlx::Error> {
        let query = format!("DELETE FROM todos WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Build the `SELECT` for a list query.
///
/// Only enum-derived fragments are interpolated; the priority filter is bound.
fn list_sql(query: &ListQuery) -> String {
    let filter = if query.priority.is_some() {
        " WHERE priority = $1"
    } else {
        ""
    };
    format!(
        "SELECT {COLUMNS} FROM todos{filter} ORDER BY {} {} NULLS LAST, id ASC",
        sort_column(query.sort),
        sort_direction(query.order),
    )
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::DueDate => "due_date",
        // Byte-order collation so text ordering matches the in-memory store.
        SortField::Title => "title COLLATE \"C\"",
        SortField::Priority => "priority COLLATE \"C\"",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}
