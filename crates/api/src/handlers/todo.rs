//! Handlers for the `/todos` resource.
//!
//! Every store call goes through `ConnectionManager::run`, which reconnects
//! once on demand when the store connection is missing or broken.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use todo_core::error::CoreError;
use todo_core::listing::ListQuery;
use todo_core::todo::{self as model, TodoInput, ENTITY_NAME};
use todo_core::types::TodoId;

use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::{DeletedTodoResponse, TodoListResponse, TodoResponse};
use crate::state::AppState;

fn not_found(id: TodoId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: ENTITY_NAME,
        id: id.to_string(),
    })
}

/// GET /api/todos
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<TodoListResponse>> {
    let Query(params) = params?;
    let query = ListQuery::parse(
        params.priority.as_deref(),
        params.sort.as_deref(),
        params.order.as_deref(),
    )?;

    let query = &query;
    let todos = state
        .store
        .run(|store| async move { store.list(query).await })
        .await?;

    Ok(Json(TodoListResponse {
        message: "Todos retrieved successfully",
        count: todos.len(),
        todos,
    }))
}

/// GET /api/todos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TodoResponse>> {
    let id = model::parse_todo_id(&id)?;

    let todo = state
        .store
        .run(|store| async move { store.find(id).await })
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(TodoResponse {
        message: "Todo retrieved successfully",
        todo,
    }))
}

/// POST /api/todos
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TodoResponse>)> {
    let Json(input) = payload?;
    model::validate(&input).into_result()?;

    let record = model::create_record(&input, Utc::now());
    let record = &record;
    let todo = state
        .store
        .run(|store| async move { store.insert(record).await })
        .await?;

    tracing::info!(todo_id = %todo.id, "Todo created");
    Ok((
        StatusCode::CREATED,
        Json(TodoResponse {
            message: "Todo created successfully",
            todo,
        }),
    ))
}

/// PUT /api/todos/{id}
///
/// Checks run in order: id format, existence, payload.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> AppResult<Json<TodoResponse>> {
    let id = model::parse_todo_id(&id)?;

    let existing = state
        .store
        .run(|store| async move { store.find(id).await })
        .await?
        .ok_or_else(|| not_found(id))?;

    let Json(input) = payload?;
    model::validate(&input).into_result()?;

    let merged = model::update_record(&existing, &input, Utc::now());
    let merged = &merged;
    let todo = state
        .store
        .run(|store| async move { store.replace(merged).await })
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(todo_id = %todo.id, "Todo updated");
    Ok(Json(TodoResponse {
        message: "Todo updated successfully",
        todo,
    }))
}

/// DELETE /api/todos/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedTodoResponse>> {
    let id = model::parse_todo_id(&id)?;

    let deleted = state
        .store
        .run(|store| async move { store.delete(id).await })
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(todo_id = %deleted.id, "Todo deleted");
    Ok(Json(DeletedTodoResponse {
        message: "Todo deleted successfully",
        deleted_todo: deleted,
    }))
}
