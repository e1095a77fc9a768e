//! Store layer for the todo service.
//!
//! [`TodoStore`] is the seam between the HTTP layer and the document store.
//! [`connection::ConnectionManager`] owns the active handle, retries the
//! initial connect with linear backoff and reconnects lazily when a request
//! hits a connection-level failure.

pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::{ConnectionManager, Connector, RetryPolicy};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryConnector, MemoryTodoStore};
pub use postgres::{PgConnector, PgTodoStore, PoolSettings};
pub use store::TodoStore;

pub type DbPool = sqlx::PgPool;
