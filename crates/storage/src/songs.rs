// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable [`Song`] repository (spec.md §3, §6).

use crate::Db;
use oks_core::{Error, Result, Song, SongId, SongSource};
use sqlx::Row;

#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub favorite: Option<bool>,
    pub source: Option<SongSource>,
}

pub struct SongStore {
    db: Db,
}

impl SongStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, song: &Song) -> Result<()> {
        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?")
            .bind(song.id.as_str())
            .fetch_optional(self.db.pool())
            .await
            .map_err(storage_err)?;
        if exists.is_some() {
            return Err(Error::Conflict(format!("song {} already exists", song.id)));
        }

        sqlx::query(
            "INSERT INTO songs
                (id, title, artist, album, genre, release_date, duration_ms, source,
                 itunes_track_id, itunes_artist_id, video_id, uploader, channel_id, upload_date,
                 original_path, vocals_path, instrumental_path, cover_path, thumbnail_path,
                 plain_lyrics, synced_lyrics, has_audio_files, favorite, raw_provider_metadata,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(song.id.as_str())
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(&song.genre)
        .bind(&song.release_date)
        .bind(song.duration_ms.map(|v| v as i64))
        .bind(song.source.to_string())
        .bind(&song.itunes_track_id)
        .bind(&song.itunes_artist_id)
        .bind(&song.video_id)
        .bind(&song.uploader)
        .bind(&song.channel_id)
        .bind(&song.upload_date)
        .bind(&song.original_path)
        .bind(&song.vocals_path)
        .bind(&song.instrumental_path)
        .bind(&song.cover_path)
        .bind(&song.thumbnail_path)
        .bind(&song.plain_lyrics)
        .bind(&song.synced_lyrics)
        .bind(song.has_audio_files)
        .bind(song.favorite)
        .bind(song.raw_provider_metadata.as_ref().map(|v| v.to_string()))
        .bind(song.created_at)
        .bind(song.updated_at)
        .execute(self.db.pool())
        .await
        .map_err(storage_err)?;

        self.db.checkpoint_after_commit().await;
        Ok(())
    }

    pub async fn get(&self, id: &SongId) -> Result<Song> {
        let row = sqlx::query("SELECT * FROM songs WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.db.pool())
            .await
            .map_err(storage_err)?
            .ok_or_else(|| Error::NotFound(format!("song {id}")))?;
        row_to_song(&row)
    }

    /// Persist a full song snapshot (enrichment results, artifact paths,
    /// user edits). Verifies the row still exists.
    pub async fn update(&self, song: &Song) -> Result<()> {
        let result = sqlx::query(
            "UPDATE songs SET
                title = ?, artist = ?, album = ?, genre = ?, release_date = ?, duration_ms = ?,
                itunes_track_id = ?, itunes_artist_id = ?, video_id = ?, uploader = ?, channel_id = ?, upload_date = ?,
                original_path = ?, vocals_path = ?, instrumental_path = ?, cover_path = ?, thumbnail_path = ?,
                plain_lyrics = ?, synced_lyrics = ?, has_audio_files = ?, favorite = ?, raw_provider_metadata = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(&song.genre)
        .bind(&song.release_date)
        .bind(song.duration_ms.map(|v| v as i64))
        .bind(&song.itunes_track_id)
        .bind(&song.itunes_artist_id)
        .bind(&song.video_id)
        .bind(&song.uploader)
        .bind(&song.channel_id)
        .bind(&song.upload_date)
        .bind(&song.original_path)
        .bind(&song.vocals_path)
        .bind(&song.instrumental_path)
        .bind(&song.cover_path)
        .bind(&song.thumbnail_path)
        .bind(&song.plain_lyrics)
        .bind(&song.synced_lyrics)
        .bind(song.has_audio_files)
        .bind(song.favorite)
        .bind(song.raw_provider_metadata.as_ref().map(|v| v.to_string()))
        .bind(song.updated_at)
        .bind(song.id.as_str())
        .execute(self.db.pool())
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("song {}", song.id)));
        }
        self.db.checkpoint_after_commit().await;
        Ok(())
    }

    /// Row delete only; the caller is responsible for removing the
    /// artifacts directory via `oks-artifacts` (spec.md §4.3).
    pub async fn delete(&self, id: &SongId) -> Result<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id.as_str())
            .execute(self.db.pool())
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("song {id}")));
        }
        self.db.checkpoint_after_commit().await;
        Ok(())
    }

    pub async fn list(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        let mut query = String::from("SELECT * FROM songs WHERE 1=1");
        if filter.favorite.is_some() {
            query.push_str(" AND favorite = ?");
        }
        if filter.source.is_some() {
            query.push_str(" AND source = ?");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query(&query);
        if let Some(favorite) = filter.favorite {
            q = q.bind(favorite);
        }
        if let Some(source) = filter.source {
            q = q.bind(source.to_string());
        }

        let rows = q.fetch_all(self.db.pool()).await.map_err(storage_err)?;
        rows.iter().map(row_to_song).collect()
    }
}

fn storage_err(e: sqlx::Error) -> Error {
    Error::StorageFailure(e.to_string())
}

fn parse_source(raw: &str) -> Result<SongSource> {
    match raw {
        "upload" => Ok(SongSource::Upload),
        "youtube" => Ok(SongSource::Youtube),
        other => Err(Error::StorageFailure(format!("unknown song source in row: {other}"))),
    }
}

fn row_to_song(row: &sqlx::sqlite::SqliteRow) -> Result<Song> {
    let source_raw: String = row.try_get("source").map_err(storage_err)?;
    let raw_metadata: Option<String> = row.try_get("raw_provider_metadata").map_err(storage_err)?;
    Ok(Song {
        id: SongId::from_string(row.try_get::<String, _>("id").map_err(storage_err)?),
        title: row.try_get("title").map_err(storage_err)?,
        artist: row.try_get("artist").map_err(storage_err)?,
        album: row.try_get("album").map_err(storage_err)?,
        genre: row.try_get("genre").map_err(storage_err)?,
        release_date: row.try_get("release_date").map_err(storage_err)?,
        duration_ms: row.try_get::<Option<i64>, _>("duration_ms").map_err(storage_err)?.map(|v| v as u64),
        source: parse_source(&source_raw)?,
        itunes_track_id: row.try_get("itunes_track_id").map_err(storage_err)?,
        itunes_artist_id: row.try_get("itunes_artist_id").map_err(storage_err)?,
        video_id: row.try_get("video_id").map_err(storage_err)?,
        uploader: row.try_get("uploader").map_err(storage_err)?,
        channel_id: row.try_get("channel_id").map_err(storage_err)?,
        upload_date: row.try_get("upload_date").map_err(storage_err)?,
        original_path: row.try_get("original_path").map_err(storage_err)?,
        vocals_path: row.try_get("vocals_path").map_err(storage_err)?,
        instrumental_path: row.try_get("instrumental_path").map_err(storage_err)?,
        cover_path: row.try_get("cover_path").map_err(storage_err)?,
        thumbnail_path: row.try_get("thumbnail_path").map_err(storage_err)?,
        plain_lyrics: row.try_get("plain_lyrics").map_err(storage_err)?,
        synced_lyrics: row.try_get("synced_lyrics").map_err(storage_err)?,
        has_audio_files: row.try_get("has_audio_files").map_err(storage_err)?,
        favorite: row.try_get("favorite").map_err(storage_err)?,
        raw_provider_metadata: raw_metadata
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| Error::StorageFailure(format!("decode raw_provider_metadata: {e}")))?,
        created_at: row.try_get("created_at").map_err(storage_err)?,
        updated_at: row.try_get("updated_at").map_err(storage_err)?,
    })
}

#[cfg(test)]
#[path = "songs_tests.rs"]
mod tests;
