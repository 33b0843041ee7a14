use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use parttrack_api::config::ServerConfig;
use parttrack_api::router::build_app_router;
use parttrack_api::state::AppState;
use parttrack_engine::LifecycleEngine;
use parttrack_events::EventBus;
use parttrack_store::{LockManager, PartStore};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        lock_ttl_secs: 120,
    }
}

/// Build the full application router with all middleware layers over a
/// fresh in-memory store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so integration tests
/// exercise the exact middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses. The returned router is
/// cheaply cloneable and all clones share the same store and lock table.
pub fn build_test_app() -> Router {
    let config = test_config();

    let event_bus = Arc::new(EventBus::default());
    let store = Arc::new(PartStore::new());
    let locks = Arc::new(LockManager::new(Arc::clone(&event_bus)));
    let engine = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        Arc::clone(&locks),
        Arc::clone(&event_bus),
    ));

    let state = AppState {
        store,
        locks,
        engine,
        event_bus,
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request failed")
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a POST request with a JSON body and no actor header.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Send a POST request with an empty body on behalf of `actor`.
pub async fn post_as(app: Router, uri: &str, actor: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-actor-id", actor)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a PATCH request with a JSON body on behalf of `actor`.
pub async fn patch_json_as(
    app: Router,
    uri: &str,
    actor: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header("x-actor-id", actor)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Send a DELETE request on behalf of `actor`.
pub async fn delete_as(app: Router, uri: &str, actor: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("x-actor-id", actor)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body was not valid JSON")
}

/// Create a record via the API and return its id.
pub async fn create_record(app: Router, part_number: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/records",
        serde_json::json!({
            "part_number": part_number,
            "description": "integration test part",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_i64().expect("created record has id")
}
