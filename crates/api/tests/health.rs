//! Integration tests for the info and health endpoints and general HTTP
//! behaviour (middleware).

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, send};

// ---------------------------------------------------------------------------
// Test: GET /health reports ok when the store answers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::spawn_app().await;
    let response = get(app.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["mongodb"], "connected");
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// Test: GET /health reports degraded, still 200, without reconnecting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_degraded_when_store_down() {
    let app = common::spawn_degraded_app().await;
    let attempts_before = app.connector.attempts();

    let response = get(app.app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["mongodb"], "disconnected");
    assert_eq!(app.connector.attempts(), attempts_before);
}

#[tokio::test]
async fn health_check_degrades_when_installed_handle_stops_answering() {
    let app = common::spawn_app().await;
    app.store.set_available(false);

    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["mongodb"], "disconnected");

    // The handle stays installed; only data requests reconnect.
    assert!(app.manager.is_connected());
}

#[tokio::test]
async fn health_recovers_after_lazy_reconnect() {
    let app = common::spawn_degraded_app().await;
    app.store.set_available(true);

    // /health alone never reconnects.
    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["status"], "degraded");

    let response = get(app.app(), "/api/todos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["status"], "ok");
}

// ---------------------------------------------------------------------------
// Test: GET / returns service info
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_returns_service_info() {
    let app = common::spawn_app().await;
    let response = get(app.app(), "/").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Todo Backend API");
    assert_eq!(json["status"], "running");
    assert_eq!(json["mongodb"], "connected");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn root_reports_disconnected_in_degraded_mode() {
    let app = common::spawn_degraded_app().await;
    let json = body_json(get(app.app(), "/").await).await;

    assert_eq!(json["status"], "running");
    assert_eq!(json["mongodb"], "disconnected");
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::spawn_app().await;
    let response = get(app.app(), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::spawn_app().await;
    let response = get(app.app(), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // The value should be a valid UUID (36 chars with hyphens).
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let app = common::spawn_app().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();

    let response = send(app.app(), request).await;
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

// ---------------------------------------------------------------------------
// Test: security headers are set on every response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn security_headers_are_present() {
    let app = common::spawn_app().await;

    for uri in ["/health", "/api/todos", "/api/todos/abc"] {
        let response = get(app.app(), uri).await;
        let headers = response.headers();

        assert_eq!(headers["x-content-type-options"], "nosniff", "{uri}");
        assert_eq!(headers["x-frame-options"], "DENY", "{uri}");
        assert_eq!(headers["x-xss-protection"], "1; mode=block", "{uri}");
        assert_eq!(
            headers["referrer-policy"],
            "strict-origin-when-cross-origin",
            "{uri}"
        );
    }
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = common::spawn_app().await;

    // CORS preflight requires custom headers, so we build the request manually.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/todos")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "PUT")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-max-age"], "86400");

    let allow_methods = headers["access-control-allow-methods"].to_str().unwrap();
    for method in ["GET", "POST", "PUT", "DELETE"] {
        assert!(
            allow_methods.contains(method),
            "Allow-Methods should contain {method}, got: {allow_methods}"
        );
    }
    assert!(headers.get("access-control-allow-credentials").is_none());
}
