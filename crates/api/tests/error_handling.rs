//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router or
//! store is involved.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use todo_api::error::AppError;
use todo_core::error::CoreError;
use todo_db::StoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Todo",
        id: "4f0c8a52-4a4b-4bd4-9a53-1d1c3b0c2e11".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(
        json["error"],
        "Todo with id 4f0c8a52-4a4b-4bd4-9a53-1d1c3b0c2e11 not found"
    );
}

#[tokio::test]
async fn validation_error_lists_field_messages() {
    let err = AppError::Core(CoreError::Validation(vec![
        "title must not be empty".into(),
        "dueDate must be a valid date".into(),
    ]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(
        json["errors"],
        serde_json::json!(["title must not be empty", "dueDate must be a valid date"])
    );
}

#[tokio::test]
async fn invalid_id_returns_400() {
    let err = AppError::Core(CoreError::InvalidId("'abc' is not a valid todo id".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ID");
    assert_eq!(json["error"], "'abc' is not a valid todo id");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Failed to parse the request body as JSON".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Failed to parse the request body as JSON");
}

#[tokio::test]
async fn store_unavailable_returns_503() {
    let err = AppError::from(StoreError::Unavailable("connection refused".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
    assert_eq!(json["error"], "Database is not available");
    assert!(json.get("detail").is_none());
}

#[tokio::test]
async fn store_operation_error_returns_500_and_sanitizes_message() {
    let err = AppError::from(StoreError::Operation("duplicate key value".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn internal_error_detail_only_in_debug_builds() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
    if cfg!(debug_assertions) {
        assert_eq!(json["detail"], "secret database credentials leaked");
    } else {
        assert!(json.get("detail").is_none());
    }
}

#[tokio::test]
async fn core_internal_maps_to_500() {
    let err = AppError::Core(CoreError::Internal("invariant broken".into()));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

#[test]
fn store_error_converts_through_from() {
    let err: AppError = StoreError::Unavailable("down".into()).into();
    assert_matches!(err, AppError::Store(StoreError::Unavailable(_)));
}
