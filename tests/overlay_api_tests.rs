//! Integration tests for the overlay CRUD API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use overlaycast::config::StreamSettings;
use overlaycast::overlay::MemoryOverlayStore;
use overlaycast::server::{AppState, SharedState, router};
use overlaycast::stream::StreamSupervisor;

/// Router state with an empty overlay store. Stream endpoints are not
/// exercised here, so the transcoder can be absent.
fn test_state() -> SharedState {
    let tmp = Box::leak(Box::new(tempfile::tempdir().unwrap()));
    let settings = StreamSettings {
        root: tmp.path().join("streams"),
        transcoder: "/nonexistent/transcoder-binary".to_string(),
        startup_check_secs: 1,
        grace_period_secs: 1,
    };
    Arc::new(AppState {
        supervisor: Arc::new(StreamSupervisor::new(&settings).unwrap()),
        overlays: Arc::new(MemoryOverlayStore::new()),
        public_base_url: "http://localhost:5000".to_string(),
        cors_origins: vec![],
    })
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_overlay(app: &axum::Router, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/overlays", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let app = router(test_state());

    let created = create_overlay(
        &app,
        serde_json::json!({"type": "text", "content": "Hello"}),
    )
    .await;

    assert!(!created["_id"].as_str().unwrap().is_empty());
    assert_eq!(created["type"], "text");
    assert_eq!(created["content"], "Hello");
    assert_eq!(created["position"]["x"], 50.0);
    assert_eq!(created["position"]["y"], 50.0);
    assert_eq!(created["size"]["width"], 200);
    assert_eq!(created["size"]["height"], 100);
    assert!(created["created_at"].is_string());
}

#[tokio::test]
async fn test_create_validation() {
    let app = router(test_state());

    // Unknown kind
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/overlays",
            serde_json::json!({"type": "video", "content": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing content
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/overlays",
            serde_json::json!({"type": "text"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("content"));

    // Out-of-range size
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/overlays",
            serde_json::json!({
                "type": "image",
                "content": "http://example.com/logo.png",
                "size": {"width": 5, "height": 100}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing got stored
    let response = app.clone().oneshot(get("/api/overlays")).await.unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_newest_first() {
    let app = router(test_state());

    create_overlay(&app, serde_json::json!({"type": "text", "content": "first"})).await;
    create_overlay(&app, serde_json::json!({"type": "text", "content": "second"})).await;

    let response = app.clone().oneshot(get("/api/overlays")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["content"], "second");
    assert_eq!(listed[1]["content"], "first");
}

#[tokio::test]
async fn test_get_overlay() {
    let app = router(test_state());

    let created = create_overlay(&app, serde_json::json!({"type": "text", "content": "hi"})).await;
    let id = created["_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/overlays/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["content"], "hi");

    let response = app
        .clone()
        .oneshot(get("/api/overlays/missing-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_overlay() {
    let app = router(test_state());

    let created = create_overlay(&app, serde_json::json!({"type": "text", "content": "old"})).await;
    let id = created["_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/overlays/{id}"),
            serde_json::json!({"content": "new", "position": {"x": 10.0, "y": 20.0}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["content"], "new");
    assert_eq!(updated["position"]["x"], 10.0);
    // Untouched fields survive the patch
    assert_eq!(updated["type"], "text");
    assert_eq!(updated["size"]["width"], 200);

    // Invalid size patch is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/overlays/{id}"),
            serde_json::json!({"size": {"width": 9999, "height": 100}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown id
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/overlays/missing-id",
            serde_json::json!({"content": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_overlay() {
    let app = router(test_state());

    let created = create_overlay(&app, serde_json::json!({"type": "text", "content": "bye"})).await;
    let id = created["_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/overlays/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["message"]
        .as_str()
        .unwrap()
        .contains("deleted"));

    // Second delete is a 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/overlays/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_delete() {
    let app = router(test_state());

    // Empty id list is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/overlays/bulk-delete",
            serde_json::json!({"overlay_ids": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let a = create_overlay(&app, serde_json::json!({"type": "text", "content": "a"})).await;
    let b = create_overlay(&app, serde_json::json!({"type": "text", "content": "b"})).await;
    create_overlay(&app, serde_json::json!({"type": "text", "content": "c"})).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/overlays/bulk-delete",
            serde_json::json!({
                "overlay_ids": [a["_id"], b["_id"], "missing-id"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["deleted_count"], 2);

    let response = app.clone().oneshot(get("/api/overlays")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}
