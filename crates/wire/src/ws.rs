// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket message shapes for `/jobs` and `/performance` (spec.md §4.10).

use crate::job::JobResponse;
use oks_core::PerformanceState;
use serde::{Deserialize, Serialize};

/// Server → client messages on the `jobs_updates` room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobsServerMessage {
    Snapshot { jobs: Vec<JobResponse> },
    JobCreated { job: JobResponse },
    JobUpdated { job: JobResponse },
    JobCompleted { job: JobResponse },
    JobFailed { job: JobResponse },
    JobCancelled { job: JobResponse },
}

/// Client → server messages on the `global_performance_controls` room.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PerformanceClientMessage {
    JoinPerformance,
    LeavePerformance,
    UpdatePerformanceControl { control: String, value: serde_json::Value },
    UpdatePlayerState {
        #[serde(default, rename = "isPlaying")]
        is_playing: Option<bool>,
        #[serde(default, rename = "currentTime")]
        current_time: Option<f64>,
        #[serde(default)]
        duration: Option<f64>,
    },
    PlaybackPlay,
    PlaybackPause,
    ResetPlayerState,
}

/// Server → client messages on the `global_performance_controls` room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PerformanceServerMessage {
    PerformanceState { state: PerformanceState },
    ControlUpdated { control: String, value: serde_json::Value },
    PlaybackPlay,
    PlaybackPause,
    ResetPlayerState,
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
