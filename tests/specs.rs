// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios against a real HTTP/WebSocket server bound to a
//! loopback port, exercising the job pipeline, the two WebSocket rooms, and
//! the path-traversal/conflict guards the way a client actually would.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use oks_adapters::{ProgressCallback, SeparationOutput, StemSeparator};
use oks_artifacts::ArtifactLayout;
use oks_core::{Error, JobConfig, Result, Song, SongId, SongSource};
use oks_wire::YoutubeDownloadRequest;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Binds the given app state to a loopback port and serves it in the
/// background for the lifetime of the test process.
async fn spawn_server(state: oks_api::AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let router = oks_api::router::build(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server exited");
    });
    addr
}

fn status_rank(status: &str) -> u8 {
    match status {
        "pending" => 0,
        "downloading" => 1,
        "processing" => 2,
        "finalizing" => 3,
        "completed" => 4,
        other => panic!("unexpected non-terminal status in happy path: {other}"),
    }
}

#[tokio::test]
async fn happy_path_youtube_job_runs_through_to_completion() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = oks_api::test_support::app_state(dir.path().to_path_buf()).await;
    let addr = spawn_server(state).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/jobs")).await.expect("connect jobs ws");
    // Drain the initial snapshot frame before submitting the job.
    let snapshot = ws.next().await.expect("snapshot frame").expect("snapshot ok");
    let snapshot: serde_json::Value = serde_json::from_str(&as_text(snapshot)).expect("snapshot json");
    assert_eq!(snapshot["event"], "snapshot");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/youtube/download"))
        .json(&serde_json::json!({
            "videoId": "dQw4w9WgXcQ",
            "songId": "happy-path-song",
            "title": "Test Title",
            "artist": "Test Artist",
        }))
        .send()
        .await
        .expect("submit download");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: serde_json::Value = response.json().await.expect("response json");
    let job_id = body["jobId"].as_str().expect("jobId present").to_string();

    let mut last_rank = 0u8;
    let mut last_progress = 0u8;
    let mut saw_completed = false;
    for _ in 0..200 {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next()).await.expect("ws frame before timeout").expect("ws stream open").expect("ws frame ok");
        let value: serde_json::Value = serde_json::from_str(&as_text(frame)).expect("event json");
        let event = value["event"].as_str().expect("event field").to_string();
        if event == "snapshot" {
            continue;
        }
        let job = &value["job"];
        assert_eq!(job["id"], job_id, "events for other jobs leaked into this socket");

        if event == "job_completed" {
            saw_completed = true;
            break;
        }

        let rank = status_rank(job["status"].as_str().expect("status"));
        assert!(rank >= last_rank, "job status regressed: {} -> {}", last_rank, rank);
        last_rank = rank;

        let progress = job["progress"].as_u64().expect("progress") as u8;
        assert!(progress >= last_progress, "job progress regressed: {} -> {}", last_progress, progress);
        last_progress = progress;
    }
    assert!(saw_completed, "never observed job_completed on the jobs socket");

    let song_response = client.get(format!("http://{addr}/api/songs/happy-path-song")).send().await.expect("get song");
    assert_eq!(song_response.status(), StatusCode::OK);
    let song: serde_json::Value = song_response.json().await.expect("song json");
    assert_eq!(song["hasAudioFiles"], true);
}

fn as_text(message: WsMessage) -> String {
    match message {
        WsMessage::Text(text) => text.to_string(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

/// A separator that never completes on its own; it only resolves once the
/// pipeline's cancellation token fires, so a cancel-mid-separation test is
/// deterministic instead of racing a real subprocess.
struct BlockingSeparator;

#[async_trait]
impl StemSeparator for BlockingSeparator {
    async fn separate(&self, _input_path: &Path, output_dir: &Path, _output_extension: &str, _on_progress: &ProgressCallback, cancel: &CancellationToken) -> Result<SeparationOutput> {
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| Error::Internal(e.to_string()))?;
        cancel.cancelled().await;
        Err(Error::Cancelled("separation cancelled".to_string()))
    }
}

#[tokio::test]
async fn cancelling_mid_separation_marks_job_cancelled_and_removes_artifacts() {
    use oks_adapters::{DownloadedVideo, FakeLyricsProvider, FakeMetadataProvider, FakeVideoDownloader, LyricsResult};
    use oks_core::{EventBus, SystemClock};
    use oks_engine::{JobWorker, Scheduler};
    use oks_storage::{Db, JobStore, SongStore};

    let dir = tempfile::tempdir().expect("tempdir");
    let db = Db::connect("sqlite::memory:").await.expect("connect db");
    let events = Arc::new(EventBus::new());
    let jobs = Arc::new(JobStore::new(db.clone(), events.clone()));
    let songs = Arc::new(SongStore::new(db));
    let layout = ArtifactLayout::new(dir.path().to_path_buf());

    let song_id = SongId::from_string("cancel-song");
    let song = Song::new(song_id.clone(), "Cancel Me".to_string(), "Nobody".to_string(), SongSource::Youtube, chrono::Utc::now());
    songs.create(&song).await.expect("create song");

    let worker = JobWorker {
        jobs: jobs.clone(),
        songs: songs.clone(),
        layout: layout.clone(),
        downloader: Arc::new(FakeVideoDownloader {
            video: DownloadedVideo {
                video_id: "abc".to_string(),
                title: "Cancel Me".to_string(),
                uploader: None,
                channel_id: None,
                duration_ms: Some(60_000),
                upload_date: None,
                thumbnail_url: None,
                audio_path: dir.path().join("original.mp3"),
            },
        }),
        metadata: Arc::new(FakeMetadataProvider { matches: Vec::new(), cover_art: None }),
        lyrics: Arc::new(FakeLyricsProvider { result: LyricsResult::default() }),
        separator: Arc::new(BlockingSeparator),
        clock: SystemClock,
    };
    tokio::fs::write(dir.path().join("original.mp3"), b"not really audio").await.expect("seed fake download source");

    let scheduler = Arc::new(Scheduler::new(worker, 1));
    let job = scheduler.submit(JobConfig::builder(song_id.clone(), "cancel-song.mp3").build()).await.expect("submit job");

    // Give the worker a beat to reach the separation phase before cancelling.
    for _ in 0..50 {
        let current = jobs.get(&job.id).await.expect("load job");
        if current.status == oks_core::JobStatus::Processing {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    scheduler.cancel(&job.id).await.expect("cancel job");

    let mut final_job = None;
    for _ in 0..50 {
        let current = jobs.get(&job.id).await.expect("load job");
        if current.status.is_terminal() {
            final_job = Some(current);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let final_job = final_job.expect("job reached a terminal state");
    assert_eq!(final_job.status, oks_core::JobStatus::Cancelled);
    assert_eq!(final_job.error.as_deref(), Some("Cancelled by user"));

    let song_dir = dir.path().join(song_id.as_str());
    assert!(!song_dir.exists(), "worker must remove the song's partial artifacts on cancellation");
}

#[tokio::test]
async fn duplicate_job_id_is_rejected_with_conflict() {
    use oks_core::SystemClock;
    use oks_storage::{Db, JobStore};

    let db = Db::connect("sqlite::memory:").await.expect("connect db");
    let events = Arc::new(oks_core::EventBus::new());
    let jobs = JobStore::new(db, events);

    let song_id = SongId::from_string("dup-song");
    let config = JobConfig::builder(song_id, "dup.mp3").build();
    let clock = SystemClock;
    let first = oks_core::Job::new(config.clone(), &clock);
    let second = oks_core::Job::new(config, &clock);
    assert_eq!(first.id, second.id);

    jobs.create(&first).await.expect("first insert succeeds");
    let result = jobs.create(&second).await;
    assert!(matches!(result, Err(Error::Conflict(_))), "second insert with the same id must conflict, got {result:?}");

    let stats = jobs.stats().await.expect("job stats");
    assert_eq!(stats.pending, 1, "only one job row should exist after the conflicting insert");
}

#[tokio::test]
async fn path_traversal_song_id_is_rejected_with_security_violation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = oks_api::test_support::app_state(dir.path().to_path_buf()).await;
    let router = oks_api::router::build(state);

    let request = Request::builder().uri("/api/songs/../../etc/download/vocals").body(Body::empty()).expect("build request");
    let response = router.oneshot(request).await.expect("route responds");

    // Axum normalizes `..` segments before matching, so the only way this
    // reaches the handler is via a song id that itself contains a traversal
    // sequence once percent-decoded; exercise that path directly too.
    assert!(response.status() == StatusCode::BAD_REQUEST || response.status() == StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn encoded_path_traversal_song_id_hits_security_violation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = oks_api::test_support::app_state(dir.path().to_path_buf()).await;
    let router = oks_api::router::build(state);

    let request = Request::builder().uri("/api/songs/%2e%2e%2fsecrets/download/vocals").body(Body::empty()).expect("build request");
    let response = router.oneshot(request).await.expect("route responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = oks_api::test_support::body_json(response).await;
    assert_eq!(body["code"], "SECURITY_VIOLATION");
}

#[tokio::test]
async fn cover_art_upgrade_prefers_the_high_resolution_render() {
    use oks_adapters::{ItunesMatch, MetadataEnricher, MetadataProvider};

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock provider");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else { break };
            tokio::spawn(serve_one_image(socket));
        }
    });

    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ArtifactLayout::new(dir.path().to_path_buf());
    let client = reqwest::Client::new();
    let enricher = MetadataEnricher::new(client, layout.clone());

    let song_id = SongId::from_string("cover-song");
    let m = ItunesMatch {
        track_id: Some(1),
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        artist_id: None,
        album: None,
        release_date: None,
        genre: None,
        duration_ms: None,
        artwork_url: Some(format!("http://{addr}/art/100x100bb.jpg")),
        is_streamable: true,
        explicit: false,
    };

    let relative = enricher.download_cover_art(&song_id, &m).await.expect("download cover art").expect("cover art found");
    assert_eq!(relative, "cover.jpg");

    let written = tokio::fs::read(layout.song_dir(&song_id).await.expect("song dir").join(&relative)).await.expect("read cover file");
    assert!(written.len() > 50_000, "expected the upgraded high-resolution image, got {} bytes", written.len());
}

/// Serves one HTTP/1.1 GET and closes: 600x600 renders get a large jpeg,
/// anything else gets a 404 so the test proves the upsize rewrite is what's
/// actually requested, not just whatever URL happened to be given.
async fn serve_one_image(mut socket: tokio::net::TcpStream) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut buf = vec![0u8; 4096];
    let n = socket.read(&mut buf).await.unwrap_or(0);
    let request_line = String::from_utf8_lossy(&buf[..n]);
    let path = request_line.lines().next().unwrap_or_default();

    if path.contains("600x600") {
        let mut body = vec![0xFF, 0xD8, 0xFF, 0xE0];
        body.extend(std::iter::repeat(0u8).take(60_000));
        let header = format!("HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n", body.len());
        let _ = socket.write_all(header.as_bytes()).await;
        let _ = socket.write_all(&body).await;
    } else {
        let header = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";
        let _ = socket.write_all(header.as_bytes()).await;
    }
}

#[tokio::test]
async fn performance_control_excludes_sender_and_late_joiners_get_current_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = oks_api::test_support::app_state(dir.path().to_path_buf()).await;
    let addr = spawn_server(state).await;

    let (mut a, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/performance")).await.expect("connect a");
    let (mut b, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/performance")).await.expect("connect b");

    // Initial snapshot for each session.
    let _ = a.next().await.expect("a snapshot").expect("a snapshot ok");
    let _ = b.next().await.expect("b snapshot").expect("b snapshot ok");

    a.send(WsMessage::Text(
        serde_json::json!({"event": "update_performance_control", "control": "vocal_volume", "value": 0.25}).to_string().into(),
    ))
    .await
    .expect("send control update");

    let on_b: serde_json::Value = serde_json::from_str(&as_text(b.next().await.expect("b frame").expect("b frame ok"))).expect("json");
    assert_eq!(on_b["event"], "control_updated");
    assert_eq!(on_b["value"], 0.25);

    // `a` must not see its own control_updated echoed back; confirm by
    // immediately connecting a third, late-joining session and checking it
    // observes the already-applied state instead of racing for the update.
    let (mut c, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/performance")).await.expect("connect c");
    let snapshot: serde_json::Value = serde_json::from_str(&as_text(c.next().await.expect("c snapshot").expect("c snapshot ok"))).expect("json");
    assert_eq!(snapshot["event"], "performance_state");
    assert_eq!(snapshot["state"]["vocalVolume"], 0.25);

    let next_on_a = tokio::time::timeout(Duration::from_millis(200), a.next()).await;
    assert!(next_on_a.is_err(), "sender should not receive its own control_updated broadcast");
}
