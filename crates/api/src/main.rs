// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root: wires storage, adapters, the scheduler, and the HTTP
//! server together (spec.md §6).

use oks_adapters::{LrclibClient, MetadataEnricher, SubprocessSeparator, YtDlpDownloader};
use oks_api::ws::jobs::JobsHub;
use oks_api::ws::performance::PerformanceHub;
use oks_api::{router, AppState, Config};
use oks_artifacts::ArtifactLayout;
use oks_core::{EventBus, PerformanceRoom, SystemClock};
use oks_engine::{JobWorker, Scheduler};
use oks_storage::{Db, JobStore, QueueStore, SongStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = Config::from_env();
    tracing::info!(bind_addr = %config.bind_addr, library_root = %config.library_root.display(), "starting oks-api");

    let db = Db::connect(&config.database_url).await?;
    let events = Arc::new(EventBus::new());
    let jobs = Arc::new(JobStore::new(db.clone(), events.clone()));
    let songs = Arc::new(SongStore::new(db.clone()));
    let queue = Arc::new(QueueStore::new(db));
    let layout = ArtifactLayout::new(config.library_root.clone());

    // spec.md §5, §4.7: download and HTTP provider (metadata/lyrics/artwork)
    // calls use 10s connect/read timeouts so a hung provider never stalls a
    // worker indefinitely.
    let http_client = reqwest::Client::builder()
        .user_agent(format!(
            "OpenKaraokeStudio/0.1 (+contact:{})",
            config.provider_contact_email.as_deref().unwrap_or("none")
        ))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(10))
        .build()?;

    let worker = JobWorker {
        jobs: jobs.clone(),
        songs: songs.clone(),
        layout: layout.clone(),
        downloader: Arc::new(YtDlpDownloader::new(config.ytdlp_binary.clone())),
        metadata: Arc::new(MetadataEnricher::new(http_client.clone(), layout.clone())),
        lyrics: Arc::new(LrclibClient::new(http_client.clone())),
        separator: Arc::new(SubprocessSeparator::new(
            config.separator_binary.clone(),
            config.separator_model.clone(),
            config.separator_device.clone(),
        )),
        clock: SystemClock,
    };
    let scheduler = Arc::new(Scheduler::new(worker, config.worker_pool_size));
    scheduler
        .reconcile_stuck_jobs(chrono::Duration::from_std(config.stuck_job_threshold)?)
        .await?;

    let jobs_hub = Arc::new(JobsHub::new());
    events.subscribe_jobs(jobs_hub.clone());

    let state = AppState {
        config: Arc::new(config.clone()),
        jobs,
        songs,
        queue,
        layout,
        events,
        scheduler,
        jobs_hub,
        performance: PerformanceRoom::new(),
        performance_hub: Arc::new(PerformanceHub::new()),
    };

    let app = router::build(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
