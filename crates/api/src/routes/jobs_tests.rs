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
async fn youtube_download_creates_song_and_job_returns_202() {
    let (app, _dir) = test_app().await;
    let body = json!({
        "videoId": "dQw4w9WgXcQ",
        "songId": "sng-new-download",
        "title": "Never Gonna Give You Up",
        "artist": "Rick Astley",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/youtube/download")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let value = body_json(response).await;
    assert_eq!(value["status"], "pending");
    assert!(value["jobId"].as_str().unwrap().starts_with("job-"));
}

#[tokio::test]
async fn get_missing_job_returns_404() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/api/jobs/job-missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_already_terminal_job_is_rejected() {
    let (app, _dir) = test_app().await;
    let body = json!({ "videoId": "abcdefghijk", "songId": "sng-cancel-test" });
    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/youtube/download")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(created).await;
    let job_id = created["jobId"].as_str().unwrap().to_string();

    // Give the in-process dispatcher a moment to run the fake pipeline to
    // completion, then attempt to cancel the now-terminal job.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let response = app
        .oneshot(Request::builder().method("POST").uri(format!("/api/jobs/{job_id}/cancel")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
