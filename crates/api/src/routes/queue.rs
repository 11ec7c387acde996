// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/queue` handlers. Not called out as an explicit HTTP surface in
//! spec.md §6, but the queue domain model (spec.md §3) and its wire DTOs
//! both exist with no consumer; these routes give them one.

use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use oks_core::{QueueItemId, SongId};
use oks_wire::{ApiError, PushQueueRequest, QueueItemResponse, ReorderQueueRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/queue", post(push_queue_item).get(list_queue))
        .route("/api/queue/{id}", axum::routing::delete(remove_queue_item))
        .route("/api/queue/reorder", post(reorder_queue))
}

async fn push_queue_item(State(state): State<AppState>, Json(body): Json<PushQueueRequest>) -> Result<Response, ApiError> {
    let song_id = SongId::from_string(&body.song_id);
    let item = state.queue.push(song_id, body.singer, &oks_core::SystemClock).await?;
    Ok((StatusCode::CREATED, Json(QueueItemResponse::from(&item))).into_response())
}

async fn list_queue(State(state): State<AppState>) -> Result<Json<Vec<QueueItemResponse>>, ApiError> {
    let items = state.queue.list().await?;
    Ok(Json(items.iter().map(QueueItemResponse::from).collect()))
}

async fn remove_queue_item(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.queue.remove(&QueueItemId::from_string(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_queue(State(state): State<AppState>, Json(body): Json<ReorderQueueRequest>) -> Result<Json<Vec<QueueItemResponse>>, ApiError> {
    let ids: Vec<QueueItemId> = body.ordered_ids.iter().map(QueueItemId::from_string).collect();
    state.queue.reorder(&ids).await?;
    let items = state.queue.list().await?;
    Ok(Json(items.iter().map(QueueItemResponse::from).collect()))
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
