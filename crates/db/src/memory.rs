//! In-memory store.
//!
//! Selected with a `memory:` database URL for local runs, and used by the
//! HTTP tests as the fake store. [`MemoryTodoStore::set_available`] simulates
//! an outage: while offline every operation fails with
//! [`StoreError::Unavailable`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use todo_core::listing::ListQuery;
use todo_core::todo::{NewTodo, Todo};
use todo_core::types::TodoId;

use crate::connection::Connector;
use crate::error::{StoreError, StoreResult};
use crate::store::TodoStore;

#[derive(Debug)]
pub struct MemoryTodoStore {
    todos: RwLock<HashMap<TodoId, Todo>>,
    available: AtomicBool,
    closed: AtomicBool,
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self {
            todos: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            closed: AtomicBool::new(false),
        }
    }
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Whether [`TodoStore::close`] has been called on this store.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.todos.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_available()
    }

    async fn list(&self, query: &ListQuery) -> StoreResult<Vec<Todo>> {
        self.ensure_available()?;
        let todos = self.todos.read().unwrap_or_else(PoisonError::into_inner);
        let mut matching: Vec<Todo> = todos.values().filter(|t| query.matches(t)).cloned().collect();
        matching.sort_by(|a, b| query.compare(a, b));
        Ok(matching)
    }

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        self.ensure_available()?;
        let todos = self.todos.read().unwrap_or_else(PoisonError::into_inner);
        Ok(todos.get(&id).cloned())
    }

    async fn insert(&self, todo: &NewTodo) -> StoreResult<Todo> {
        self.ensure_available()?;
        let created = todo.clone().with_id(TodoId::new_v4());
        let mut todos = self.todos.write().unwrap_or_else(PoisonError::into_inner);
        todos.insert(created.id, created.clone());
        Ok(created)
    }

    async fn replace(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        self.ensure_available()?;
        let mut todos = self.todos.write().unwrap_or_else(PoisonError::into_inner);
        Ok(todos.get_mut(&todo.id).map(|stored| {
            *stored = Todo {
                created_at: stored.created_at,
                ..todo.clone()
            };
            stored.clone()
        }))
    }

    async fn delete(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        self.ensure_available()?;
        let mut todos = self.todos.write().unwrap_or_else(PoisonError::into_inner);
        Ok(todos.remove(&id))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("Memory store closed");
    }
}

/// Hands out a shared [`MemoryTodoStore`].
///
/// Connecting fails while the store is offline, and for the first
/// `failures` attempts when built with [`MemoryConnector::failing`].
pub struct MemoryConnector {
    store: Arc<MemoryTodoStore>,
    failures_remaining: AtomicU32,
    attempts: AtomicU32,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryTodoStore>) -> Self {
        Self::failing(store, 0)
    }

    pub fn failing(store: Arc<MemoryTodoStore>, failures: u32) -> Self {
        Self {
            store,
            failures_remaining: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        }
    }

    /// Number of connect attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> StoreResult<Arc<dyn TodoStore>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(StoreError::Unavailable("simulated connect failure".to_string()));
        }

        self.store.ensure_available()?;
        let store: Arc<dyn TodoStore> = self.store.clone();
        Ok(store)
    }
}
