// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/jobs` and `/api/youtube/download` request/response DTOs (spec.md §6).

use oks_core::{Job, JobStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeDownloadRequest {
    pub video_id: String,
    pub song_id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeDownloadResponse {
    pub job_id: String,
    pub status: JobStatus,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub include_dismissed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub song_id: String,
    pub filename: String,
    pub status: JobStatus,
    pub progress: u8,
    pub status_message: Option<String>,
    pub error: Option<String>,
    pub dismissed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Job> for JobResponse {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            song_id: job.song_id.to_string(),
            filename: job.filename.clone(),
            status: job.status,
            progress: job.progress,
            status_message: job.status_message.clone(),
            error: job.error.clone(),
            dismissed: job.dismissed,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
