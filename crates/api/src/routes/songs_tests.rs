// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::router;
use crate::test_support::{app_state, body_json};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

async fn test_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = app_state(dir.path().to_path_buf()).await;
    (router::build(state), dir)
}

#[tokio::test]
async fn create_song_returns_201_with_synthetic_pending_status() {
    let (app, _dir) = test_app().await;
    let body = json!({ "title": "Africa", "artist": "Toto" });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/songs")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let value = body_json(response).await;
    assert_eq!(value["status"], "pending");
    assert_eq!(value["title"], "Africa");
    assert!(value["id"].as_str().unwrap().starts_with("sng-"));
}

#[tokio::test]
async fn get_missing_song_returns_404() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/api/songs/sng-missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_songs_after_create_includes_it() {
    let (app, _dir) = test_app().await;
    let create_body = json!({ "title": "Holding Out for a Hero", "artist": "Bonnie Tyler" });
    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/songs")
                .header("content-type", "application/json")
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap().to_string();

    let list_response = app.oneshot(Request::builder().uri("/api/songs").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(list_response.status(), StatusCode::OK);
    let list = body_json(list_response).await;
    assert!(list.as_array().unwrap().iter().any(|s| s["id"] == id));
}

#[tokio::test]
async fn download_rejects_path_traversal_with_security_violation() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/songs/..%2Fetc/download/original")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // axum normalizes `..` in the path segment before routing reaches us in
    // some configurations; either a 400 from our own guard or axum's own
    // rejection is an acceptable outcome here, but a successful traversal
    // (200) is not.
    assert_ne!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn download_unknown_track_kind_returns_400() {
    let (app, _dir) = test_app().await;
    let create_body = json!({ "title": "Test", "artist": "Test" });
    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/songs")
                .header("content-type", "application/json")
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(Request::builder().uri(format!("/api/songs/{id}/download/remix")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_song_is_idempotent_on_missing_directory() {
    let (app, _dir) = test_app().await;
    let create_body = json!({ "title": "Test", "artist": "Test" });
    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/songs")
                .header("content-type", "application/json")
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(Request::builder().method("DELETE").uri(format!("/api/songs/{id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
