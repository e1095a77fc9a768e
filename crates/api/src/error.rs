use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use todo_core::error::CoreError;
use todo_db::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for store
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `todo_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A classified failure from the store layer.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Message returned in place of internal error details.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    errors: Option<Vec<String>>,
    detail: Option<String>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
            detail: None,
        }
    }

    fn internal(detail: &str) -> Self {
        Self {
            detail: Some(detail.to_string()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MESSAGE)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorParts::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(errors) => ErrorParts {
                    errors: Some(errors.clone()),
                    ..ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Validation failed")
                },
                CoreError::InvalidId(msg) => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "INVALID_ID", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorParts::internal(msg)
                }
            },

            // --- Store errors ---
            AppError::Store(StoreError::Unavailable(reason)) => {
                tracing::warn!(%reason, "Store unavailable");
                ErrorParts::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Database is not available",
                )
            }
            AppError::Store(StoreError::Operation(msg)) => {
                tracing::error!(error = %msg, "Store operation failed");
                ErrorParts::internal(msg)
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorParts::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorParts::internal(msg)
            }
        };

        let mut body = json!({
            "error": parts.message,
            "code": parts.code,
        });
        if let Some(errors) = parts.errors {
            body["errors"] = json!(errors);
        }
        // Internal details only leave the process in debug builds.
        if cfg!(debug_assertions) {
            if let Some(detail) = parts.detail {
                body["detail"] = json!(detail);
            }
        }

        (parts.status, axum::Json(body)).into_response()
    }
}
