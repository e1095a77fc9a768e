use std::sync::Arc;

use todo_db::ConnectionManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; the store manager sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Owns the store handle and reconnects on demand.
    pub store: Arc<ConnectionManager>,
}
