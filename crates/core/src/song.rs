// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Song entity: the persistent karaoke-ready track and its artifact paths.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a song. Chosen once at submission time and
    /// reused as the artifact-directory name (spec.md §4.8 idempotence).
    pub struct SongId("sng-");
}

/// How a song's original audio was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SongSource {
    Upload,
    Youtube,
}

crate::simple_display! {
    SongSource {
        Upload => "upload",
        Youtube => "youtube",
    }
}

/// The persistent entity for a karaoke-ready track and its artifacts.
///
/// Created once at submission; mutated only by the worker (to attach
/// enriched fields and artifact paths) or by explicit user edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub duration_ms: Option<u64>,
    pub source: SongSource,

    // Provider identifiers
    pub itunes_track_id: Option<String>,
    pub itunes_artist_id: Option<String>,
    pub video_id: Option<String>,
    pub uploader: Option<String>,
    pub channel_id: Option<String>,
    pub upload_date: Option<String>,

    // Artifact paths, relative to the song's directory under the library root.
    pub original_path: Option<String>,
    pub vocals_path: Option<String>,
    pub instrumental_path: Option<String>,
    pub cover_path: Option<String>,
    pub thumbnail_path: Option<String>,

    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,

    /// True only when vocals and instrumental both exist and are non-empty
    /// (spec.md §3 invariant); persisted for fast listing filters.
    pub has_audio_files: bool,
    pub favorite: bool,

    /// Free-form raw provider metadata, kept for debugging/backfill.
    pub raw_provider_metadata: Option<serde_json::Value>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Song {
    pub fn new(id: SongId, title: impl Into<String>, artist: impl Into<String>, source: SongSource, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            album: None,
            genre: None,
            release_date: None,
            duration_ms: None,
            source,
            itunes_track_id: None,
            itunes_artist_id: None,
            video_id: None,
            uploader: None,
            channel_id: None,
            upload_date: None,
            original_path: None,
            vocals_path: None,
            instrumental_path: None,
            cover_path: None,
            thumbnail_path: None,
            plain_lyrics: None,
            synced_lyrics: None,
            has_audio_files: false,
            favorite: false,
            raw_provider_metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute `has_audio_files` from the presence of both stem paths.
    pub fn refresh_has_audio_files(&mut self) {
        self.has_audio_files = self.vocals_path.is_some() && self.instrumental_path.is_some();
    }
}

crate::builder! {
    pub struct SongBuilder => Song {
        set {
            id: SongId = SongId::new(),
            source: SongSource = SongSource::Upload,
            has_audio_files: bool = false,
            favorite: bool = false,
        }
        into {
            title: String = "Test Title",
            artist: String = "Test Artist",
        }
        option {
            album: String = None,
            genre: String = None,
            release_date: String = None,
            duration_ms: u64 = None,
            itunes_track_id: String = None,
            itunes_artist_id: String = None,
            video_id: String = None,
            uploader: String = None,
            channel_id: String = None,
            upload_date: String = None,
            original_path: String = None,
            vocals_path: String = None,
            instrumental_path: String = None,
            cover_path: String = None,
            thumbnail_path: String = None,
            plain_lyrics: String = None,
            synced_lyrics: String = None,
            raw_provider_metadata: serde_json::Value = None,
        }
        computed {
            created_at: chrono::DateTime<chrono::Utc> = chrono::Utc::now(),
            updated_at: chrono::DateTime<chrono::Utc> = chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "song_tests.rs"]
mod tests;
