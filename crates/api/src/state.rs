// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state handed to every route and WebSocket handler.

use crate::config::Config;
use crate::ws::jobs::JobsHub;
use crate::ws::performance::PerformanceHub;
use oks_artifacts::ArtifactLayout;
use oks_core::{EventBus, PerformanceRoom, SystemClock};
use oks_engine::Scheduler;
use oks_storage::{JobStore, QueueStore, SongStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jobs: Arc<JobStore>,
    pub songs: Arc<SongStore>,
    pub queue: Arc<QueueStore>,
    pub layout: ArtifactLayout,
    pub events: Arc<EventBus>,
    pub scheduler: Arc<Scheduler<SystemClock>>,
    pub jobs_hub: Arc<JobsHub>,
    pub performance: PerformanceRoom,
    pub performance_hub: Arc<PerformanceHub>,
}
