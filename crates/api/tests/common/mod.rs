#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use todo_api::config::ServerConfig;
use todo_api::router::build_app_router;
use todo_api::state::AppState;
use todo_db::{ConnectionManager, Connector, MemoryConnector, MemoryTodoStore, RetryPolicy};

/// A router wired to an in-memory store, plus handles to poke at the store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTodoStore>,
    pub connector: Arc<MemoryConnector>,
    pub manager: Arc<ConnectionManager>,
}

impl TestApp {
    /// A fresh clone of the router for a single `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` from the built-in defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|_| None).expect("defaults are valid")
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
    }
}

async fn build(store_online: bool) -> TestApp {
    let store = Arc::new(MemoryTodoStore::new());
    store.set_available(store_online);

    let connector = Arc::new(MemoryConnector::new(Arc::clone(&store)));
    let manager = Arc::new(ConnectionManager::new(connector.clone(), fast_policy()));
    let connected = manager.connect_with_retry().await;
    assert_eq!(connected, store_online);

    let state = AppState {
        store: Arc::clone(&manager),
    };
    let router = build_app_router(state, &test_config());

    TestApp {
        router,
        store,
        connector,
        manager,
    }
}

/// Router over an arbitrary connector, for scripted store failures.
pub async fn spawn_router_with(connector: Arc<dyn Connector>) -> (Router, Arc<ConnectionManager>) {
    let manager = Arc::new(ConnectionManager::new(connector, fast_policy()));
    manager.connect_with_retry().await;

    let state = AppState {
        store: Arc::clone(&manager),
    };
    (build_app_router(state, &test_config()), manager)
}

/// App whose store was reachable at startup.
pub async fn spawn_app() -> TestApp {
    build(true).await
}

/// App that started while the store was down (degraded mode).
pub async fn spawn_degraded_app() -> TestApp {
    build(false).await
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body.to_string()).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body.to_string()).await
}

/// Send a raw body with a JSON content type, e.g. to test malformed payloads.
pub async fn json_request(app: Router, method: Method, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a todo and return its JSON representation.
pub async fn create_todo(app: &TestApp, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(app.app(), "/api/todos", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["todo"].clone()
}
