// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/jobs` and `/api/youtube/download` handlers (spec.md §6).

use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use oks_core::{JobConfig, JobId, Song, SongId, SongSource};
use oks_storage::JobFilter;
use oks_wire::{ApiError, JobListQuery, JobResponse, YoutubeDownloadRequest, YoutubeDownloadResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/youtube/download", post(download_from_youtube))
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/jobs/{id}/cancel", post(cancel_job))
        .route("/api/jobs/{id}/dismiss", post(dismiss_job))
}

/// Looks the song up by id; if absent, creates it from the request's
/// YouTube metadata (`original_source`: "the service will handle song
/// creation if needed"), then submits a download+separation job for it.
async fn download_from_youtube(State(state): State<AppState>, Json(body): Json<YoutubeDownloadRequest>) -> Result<Response, ApiError> {
    let song_id = SongId::from_string(&body.song_id);
    let song = match state.songs.get(&song_id).await {
        Ok(song) => song,
        Err(oks_core::Error::NotFound(_)) => {
            let mut song = Song::new(
                song_id,
                body.title.clone().unwrap_or_else(|| "Unknown Title".to_string()),
                body.artist.clone().unwrap_or_default(),
                SongSource::Youtube,
                chrono::Utc::now(),
            );
            song.video_id = Some(body.video_id.clone());
            state.songs.create(&song).await?;
            song
        }
        Err(other) => return Err(other.into()),
    };

    let filename = format!("{}.mp3", song.id);
    let job = state.scheduler.submit(JobConfig::builder(song.id, filename).build()).await?;

    let response = YoutubeDownloadResponse { job_id: job.id.to_string(), status: job.status };
    Ok((StatusCode::ACCEPTED, Json(response)).into_response())
}

async fn list_jobs(State(state): State<AppState>, Query(query): Query<JobListQuery>) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let filter = JobFilter {
        status: query.status,
        dismissed: if query.include_dismissed { None } else { Some(false) },
        since: None,
    };
    let jobs = state.jobs.list(&filter).await?;
    Ok(Json(jobs.iter().map(JobResponse::from).collect()))
}

async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobResponse>, ApiError> {
    let job = state.jobs.get(&JobId::from_string(&id)).await?;
    Ok(Json(JobResponse::from(&job)))
}

/// Cancels the job, then removes the song's partial artifacts directory
/// (spec.md §4.8: cancellation is the caller's responsibility to clean up).
async fn cancel_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobResponse>, ApiError> {
    let job_id = JobId::from_string(&id);
    state.scheduler.cancel(&job_id).await?;
    let job = state.jobs.get(&job_id).await?;
    if let Err(error) = state.layout.delete_song(&job.song_id).await {
        tracing::warn!(job_id = %job_id, %error, "failed to remove artifacts after cancellation");
    }
    Ok(Json(JobResponse::from(&job)))
}

async fn dismiss_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobResponse>, ApiError> {
    let job_id = JobId::from_string(&id);
    state.jobs.dismiss(&job_id).await?;
    let job = state.jobs.get(&job_id).await?;
    Ok(Json(JobResponse::from(&job)))
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
