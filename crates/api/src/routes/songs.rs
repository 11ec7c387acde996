// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/songs` handlers (spec.md §6).

use crate::error::{reject_unsafe_song_id, security_violation};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use oks_core::{Error, Song, SongId, SongSource};
use oks_storage::SongFilter;
use oks_wire::{ApiError, CreateSongRequest, SongListQuery, SongResponse, UpdateSongRequest};
use serde_json::{json, Value};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/songs", post(create_song).get(list_songs))
        .route("/api/songs/{id}", get(get_song).patch(update_song).delete(delete_song))
        .route("/api/songs/{id}/download/{track}", get(download_track))
        .route("/api/songs/{id}/thumbnail", get(download_thumbnail))
        .route("/api/songs/{id}/cover", get(download_cover))
}

/// Creates the song row and its artifact directory. The response carries a
/// synthetic `status: "pending"` field (not a persisted column) matching
/// `original_source`'s `create_song` response shape.
async fn create_song(State(state): State<AppState>, Json(body): Json<CreateSongRequest>) -> Result<Response, ApiError> {
    let source = body.source.unwrap_or(SongSource::Upload);
    let mut song = Song::new(SongId::new(), body.title, body.artist, source, chrono::Utc::now());
    song.album = body.album;
    song.duration_ms = body.duration_ms;
    song.video_id = body.video_id;

    state.songs.create(&song).await?;
    // Directory creation failures are non-fatal (original behavior: "continue
    // even if directory creation fails, we'll try again during processing").
    if let Err(error) = state.layout.song_dir(&song.id).await {
        tracing::warn!(song_id = %song.id, %error, "failed to create song directory at creation time");
    }

    let mut body: Value = serde_json::to_value(SongResponse::from(&song)).unwrap_or_else(|_| json!({}));
    if let Some(map) = body.as_object_mut() {
        map.insert("status".to_string(), json!("pending"));
    }
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn list_songs(State(state): State<AppState>, Query(query): Query<SongListQuery>) -> Result<Json<Vec<SongResponse>>, ApiError> {
    let filter = SongFilter { favorite: query.favorite, source: None };
    let songs = state.songs.list(&filter).await?;
    Ok(Json(songs.iter().map(SongResponse::from).collect()))
}

async fn get_song(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SongResponse>, ApiError> {
    let song = state.songs.get(&SongId::from_string(&id)).await?;
    Ok(Json(SongResponse::from(&song)))
}

async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateSongRequest>,
) -> Result<Json<SongResponse>, ApiError> {
    let id = SongId::from_string(&id);
    let mut song = state.songs.get(&id).await?;
    if let Some(title) = body.title {
        song.title = title;
    }
    if let Some(artist) = body.artist {
        song.artist = artist;
    }
    if body.album.is_some() {
        song.album = body.album;
    }
    if let Some(favorite) = body.favorite {
        song.favorite = favorite;
    }
    song.updated_at = chrono::Utc::now();
    state.songs.update(&song).await?;
    Ok(Json(SongResponse::from(&song)))
}

/// Deletes the row, then the artifacts directory (spec.md §4.3: the store
/// never touches the filesystem itself).
async fn delete_song(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let song_id = SongId::from_string(&id);
    state.songs.delete(&song_id).await?;
    if let Err(error) = state.layout.delete_song(&song_id).await {
        tracing::warn!(song_id = %song_id, %error, "failed to delete song directory");
    }
    Ok(Json(json!({ "message": "Song deleted successfully" })))
}

async fn download_track(State(state): State<AppState>, Path((id, track)): Path<(String, String)>) -> Result<Response, ApiError> {
    if let Some(rejection) = reject_unsafe_song_id(&id) {
        return Ok(rejection);
    }

    let song = state.songs.get(&SongId::from_string(&id)).await?;
    let relative_path = match track.as_str() {
        "vocals" => song.vocals_path.clone(),
        "instrumental" => song.instrumental_path.clone(),
        "original" => song.original_path.clone(),
        _ => return Err(Error::Validation(format!("unknown track kind: {track}")).into()),
    }
    .ok_or_else(|| Error::NotFound(format!("song {id} has no {track} artifact")))?;

    serve_artifact(&state, &id, &relative_path).await
}

async fn download_thumbnail(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    if let Some(rejection) = reject_unsafe_song_id(&id) {
        return Ok(rejection);
    }
    let song_id = SongId::from_string(&id);
    let path = state
        .layout
        .thumbnail_path(&song_id)
        .await
        .ok_or_else(|| Error::NotFound(format!("song {id} has no thumbnail")))?;
    serve_file(&path).await
}

async fn download_cover(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    if let Some(rejection) = reject_unsafe_song_id(&id) {
        return Ok(rejection);
    }
    let song_id = SongId::from_string(&id);
    let path = state
        .layout
        .cover_path(&song_id)
        .await
        .ok_or_else(|| Error::NotFound(format!("song {id} has no cover art")))?;
    serve_file(&path).await
}

async fn serve_artifact(state: &AppState, song_id: &str, relative: &str) -> Result<Response, ApiError> {
    let path = match state.layout.resolve_secure(song_id, relative) {
        Ok(path) => path,
        Err(Error::AccessDenied(detail)) => return Ok(security_violation(detail)),
        Err(other) => return Err(other.into()),
    };
    serve_file(&path).await
}

async fn serve_file(path: &std::path::Path) -> Result<Response, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::StorageFailure(format!("read {}: {e}", path.display())))?;
    let content_type = content_type_for(path);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Extension-based content type. Good enough for the fixed set of
/// extensions this service ever writes (spec.md §4.3, §4.4).
fn content_type_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "webp" => "image/webp",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "songs_tests.rs"]
mod tests;
