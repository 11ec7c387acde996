// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/songs` request/response DTOs (spec.md §6).

use oks_core::{Song, SongSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSongRequest {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_ms: Option<u64>,
    pub source: Option<SongSource>,
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub favorite: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SongListQuery {
    pub favorite: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongResponse {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub duration_ms: Option<u64>,
    pub source: SongSource,
    pub video_id: Option<String>,
    pub uploader: Option<String>,
    pub has_audio_files: bool,
    pub favorite: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Song> for SongResponse {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id.to_string(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            genre: song.genre.clone(),
            release_date: song.release_date.clone(),
            duration_ms: song.duration_ms,
            source: song.source,
            video_id: song.video_id.clone(),
            uploader: song.uploader.clone(),
            has_audio_files: song.has_audio_files,
            favorite: song.favorite,
            created_at: song.created_at,
            updated_at: song.updated_at,
        }
    }
}

#[cfg(test)]
#[path = "song_tests.rs"]
mod tests;
