//! Query parameter types for API handlers.

use serde::Deserialize;

/// Raw `GET /todos` parameters (`?priority=&sort=&order=`).
///
/// Parsed into a `todo_core::listing::ListQuery` by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub priority: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}
