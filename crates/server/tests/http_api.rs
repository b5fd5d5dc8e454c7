//! HTTP contract tests: the router is driven in-process with `oneshot`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use receiver_server::api::{ErrorResponse, HealthResponse};
use receiver_server::build_router;

use common::{app_state, app_state_with_timeout, MemoryStore, RecordingDispatcher};

fn app(store: &Arc<MemoryStore>, queue: &Arc<RecordingDispatcher>) -> Router {
    build_router(app_state(store, queue))
}

async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// ── POST /images/post ────────────────────────────────────────────

#[tokio::test]
async fn batch_reports_one_line_per_item() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, body) = send(
        app(&store, &queue),
        Method::POST,
        "/images/post",
        r#"{"paths":[{"path":"/a.jpg"},{"path":""},{"path":"/b.jpg"}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4, "header plus one line per item: {body}");
    assert_eq!(lines[0], "got 3 path(s)");
    assert!(lines[1].contains("image saved with id 1"));
    assert!(lines[2].contains("path cannot be an empty string"));
    assert!(lines[3].contains("image saved with id 2"));
    assert_eq!(queue.sent(), vec![1, 2]);
}

#[tokio::test]
async fn batch_with_failures_still_answers_ok() {
    let store = Arc::new(MemoryStore::failing_on(&["/bad.jpg"]));
    let queue = Arc::new(RecordingDispatcher::failing());

    let (status, body) = send(
        app(&store, &queue),
        Method::POST,
        "/images/post",
        r#"{"paths":[{"path":"/bad.jpg"},{"path":"/ok.jpg"}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("failed to save image"));
    assert!(body.contains("image saved with id 1 but failed to send it to the queue"));
}

#[tokio::test]
async fn empty_batch_is_rejected_before_processing() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, body) = send(app(&store, &queue), Method::POST, "/images/post", r#"{"paths":[]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(err.error, "paths cannot be empty");
    assert_eq!(store.create_calls(), 0);
    assert!(queue.sent().is_empty());
}

#[tokio::test]
async fn undecodable_batch_is_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, _) = send(app(&store, &queue), Method::POST, "/images/post", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.create_calls(), 0);
}

// ── POST /image/post ─────────────────────────────────────────────

#[tokio::test]
async fn single_path_is_saved_and_sent() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, body) = send(app(&store, &queue), Method::POST, "/image/post", r#"{"path":"/a.jpg"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("got 1 path(s)\n"));
    assert!(body.contains("image saved with id 1 and sent to the queue"));
    assert_eq!(queue.sent(), vec![1]);
}

#[tokio::test]
async fn single_path_output_matches_batch_of_one() {
    let single = {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(RecordingDispatcher::new());
        send(app(&store, &queue), Method::POST, "/image/post", r#"{"path":"/a.jpg"}"#).await
    };
    let batch = {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(RecordingDispatcher::new());
        send(app(&store, &queue), Method::POST, "/images/post", r#"{"paths":[{"path":"/a.jpg"}]}"#).await
    };

    assert_eq!(single, batch);
}

#[tokio::test]
async fn single_empty_or_missing_path_is_bad_request() {
    for body in [r#"{"path":""}"#, "{}"] {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(RecordingDispatcher::new());

        let (status, resp) = send(app(&store, &queue), Method::POST, "/image/post", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert!(resp.contains("path cannot be an empty string"));
        assert_eq!(store.create_calls(), 0);
    }
}

#[tokio::test]
async fn undecodable_single_path_is_server_error() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, body) = send(app(&store, &queue), Method::POST, "/image/post", "[1, 2").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("got error while decoding body"));
}

// ── GET /image/{id} ──────────────────────────────────────────────

#[tokio::test]
async fn saved_image_can_be_loaded() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::failing());
    let app = app(&store, &queue);

    let (status, _) = send(app.clone(), Method::POST, "/image/post", r#"{"path":"/orphan.jpg"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, Method::GET, "/image/1", "").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["path"], "/orphan.jpg");
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn unknown_image_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, body) = send(app(&store, &queue), Method::GET, "/image/99", "").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(err.error, "image not found: 99");
}

#[tokio::test]
async fn load_failure_is_server_error() {
    let store = Arc::new(MemoryStore::unreachable());
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, _) = send(app(&store, &queue), Method::GET, "/image/1", "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn slow_load_is_gateway_timeout() {
    let store = Arc::new(MemoryStore::slow(Duration::from_millis(500)));
    let queue = Arc::new(RecordingDispatcher::new());
    let app = build_router(app_state_with_timeout(&store, &queue, Duration::from_millis(50)));

    let (status, body) = send(app, Method::GET, "/image/1", "").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let err: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert!(err.error.starts_with("timed out loading image"));
}

// ── GET /health ──────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_store_state() {
    let queue = Arc::new(RecordingDispatcher::new());

    let (status, body) = send(app(&Arc::new(MemoryStore::new()), &queue), Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.store, "ok");

    let (status, body) = send(app(&Arc::new(MemoryStore::unreachable()), &queue), Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let health: HealthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(health.store, "unreachable");
}

#[tokio::test]
async fn slow_store_health_is_degraded() {
    let store = Arc::new(MemoryStore::slow(Duration::from_millis(500)));
    let queue = Arc::new(RecordingDispatcher::new());
    let app = build_router(app_state_with_timeout(&store, &queue, Duration::from_millis(50)));

    let (status, body) = send(app, Method::GET, "/health", "").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let health: HealthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(health.status, "degraded");
    assert_eq!(health.store, "unreachable");
}
