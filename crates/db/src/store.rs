use async_trait::async_trait;
use todo_core::listing::ListQuery;
use todo_core::todo::{NewTodo, Todo};
use todo_core::types::TodoId;

use crate::error::StoreResult;

/// Operations the HTTP layer issues against the `todos` collection.
///
/// Implementations must be safe to share across concurrent requests; the
/// application adds no locking of its own around them.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;

    /// List todos matching the query's filter, in the query's order.
    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Todo>>;

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    /// Insert a record; the store assigns the id.
    async fn insert(&self, todo: &NewTodo) -> StoreResult<Todo>;

    /// Overwrite the mutable fields of an existing record.
    ///
    /// `created_at` is never written. Returns `None` if the record no
    /// longer exists.
    async fn replace(&self, todo: &Todo) -> StoreResult<Option<Todo>>;

    /// Delete a record, returning it as it was before deletion.
    async fn delete(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    /// Release the underlying connection resources.
    async fn close(&self);
}
