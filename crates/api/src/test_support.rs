// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures: an in-memory `AppState` wired to fake adapters.
//!
//! Compiled whenever `feature = "test-support"` is enabled, not only under
//! `cfg(test)` (the workspace root `specs` integration test pulls this crate
//! in as a normal dependency), so the crate-level `cfg_attr(test, ...)`
//! lint allowances in `lib.rs` don't reach this module — allow explicitly.
#![allow(clippy::expect_used)]

use crate::state::AppState;
use crate::ws::jobs::JobsHub;
use crate::ws::performance::PerformanceHub;
use crate::Config;
use oks_adapters::{DownloadedVideo, FakeLyricsProvider, FakeMetadataProvider, FakeVideoDownloader, LyricsResult, NullSeparator};
use oks_artifacts::ArtifactLayout;
use oks_core::{EventBus, PerformanceRoom, SystemClock};
use oks_engine::{JobWorker, Scheduler};
use oks_storage::{Db, JobStore, QueueStore, SongStore};
use std::sync::Arc;

pub async fn app_state(library_root: std::path::PathBuf) -> AppState {
    let db = Db::connect("sqlite::memory:").await.expect("connect in-memory db");
    let events = Arc::new(EventBus::new());
    let jobs = Arc::new(JobStore::new(db.clone(), events.clone()));
    let songs = Arc::new(SongStore::new(db.clone()));
    let queue = Arc::new(QueueStore::new(db));
    let layout = ArtifactLayout::new(library_root);

    let worker = JobWorker {
        jobs: jobs.clone(),
        songs: songs.clone(),
        layout: layout.clone(),
        downloader: Arc::new(FakeVideoDownloader {
            video: DownloadedVideo {
                video_id: "dQw4w9WgXcQ".to_string(),
                title: "Fake Title".to_string(),
                uploader: Some("Fake Uploader".to_string()),
                channel_id: None,
                duration_ms: Some(180_000),
                upload_date: None,
                thumbnail_url: None,
                audio_path: std::path::PathBuf::from("original.mp3"),
            },
        }),
        metadata: Arc::new(FakeMetadataProvider { matches: Vec::new(), cover_art: None }),
        lyrics: Arc::new(FakeLyricsProvider { result: LyricsResult::default() }),
        separator: Arc::new(NullSeparator),
        clock: SystemClock,
    };
    let scheduler = Arc::new(Scheduler::new(worker, 1));
    let jobs_hub = Arc::new(JobsHub::new());
    events.subscribe_jobs(jobs_hub.clone());

    AppState {
        config: Arc::new(Config::for_tests(layout.library_root().to_path_buf())),
        jobs,
        songs,
        queue,
        layout,
        events,
        scheduler,
        jobs_hub,
        performance: PerformanceRoom::new(),
        performance_hub: Arc::new(PerformanceHub::new()),
    }
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is valid json")
}
