// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout for a song's on-disk artifacts (spec.md §4.3).
//!
//! Canonical layout under `<library_root>/<song_id>/`:
//! `original.<ext>`, `vocals.<ext>`, `instrumental.<ext>`, `thumbnail.<ext>`,
//! `cover.<ext>`. Cover/thumbnail extension is resolved by probing, since the
//! enricher may replace a low-resolution `.jpg` with a `.webp` later.

use oks_core::{Error, Result, SongId};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Probe order for format-resolved images (spec.md §4.3).
pub const IMAGE_EXTENSIONS: &[&str] = &["webp", "jpg", "jpeg", "png"];

/// Owns the on-disk library root and knows every song's artifact paths.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    library_root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(library_root: impl Into<PathBuf>) -> Self {
        Self { library_root: library_root.into() }
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Create-and-return the song's directory.
    pub async fn song_dir(&self, song_id: &SongId) -> Result<PathBuf> {
        let dir = self.song_dir_path(song_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::StorageFailure(format!("create song dir {}: {e}", dir.display())))?;
        Ok(dir)
    }

    fn song_dir_path(&self, song_id: &SongId) -> PathBuf {
        self.library_root.join(song_id.as_str())
    }

    pub fn original_path(&self, song_id: &SongId, ext: &str) -> PathBuf {
        self.song_dir_path(song_id).join(format!("original.{ext}"))
    }

    pub fn vocals_path(&self, song_id: &SongId, ext: &str) -> PathBuf {
        self.song_dir_path(song_id).join(format!("vocals.{ext}"))
    }

    pub fn instrumental_path(&self, song_id: &SongId, ext: &str) -> PathBuf {
        self.song_dir_path(song_id).join(format!("instrumental.{ext}"))
    }

    /// Probe `thumbnail.{webp,jpg,jpeg,png}` in that order; `None` if absent.
    pub async fn thumbnail_path(&self, song_id: &SongId) -> Option<PathBuf> {
        self.resolve_image(song_id, "thumbnail").await
    }

    /// Probe `cover.{webp,jpg,jpeg,png}` in that order; `None` if absent.
    pub async fn cover_path(&self, song_id: &SongId) -> Option<PathBuf> {
        self.resolve_image(song_id, "cover").await
    }

    async fn resolve_image(&self, song_id: &SongId, stem: &str) -> Option<PathBuf> {
        let dir = self.song_dir_path(song_id);
        for ext in IMAGE_EXTENSIONS {
            let candidate = dir.join(format!("{stem}.{ext}"));
            if fs::metadata(&candidate).await.is_ok() {
                return Some(candidate);
            }
        }
        None
    }

    /// Recursive remove. Absent directory is success (spec.md §4.3).
    pub async fn delete_song(&self, song_id: &SongId) -> Result<()> {
        let dir = self.song_dir_path(song_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::StorageFailure(format!("delete song dir {}: {e}", dir.display()))),
        }
    }

    /// Directory names directly under the library root.
    pub async fn list_song_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = match fs::read_dir(&self.library_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => {
                return Err(Error::StorageFailure(format!(
                    "list library {}: {e}",
                    self.library_root.display()
                )))
            }
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::StorageFailure(e.to_string()))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        Ok(ids)
    }

    /// Resolve a song id and a relative artifact name to an absolute path,
    /// rejecting anything that would escape the library root (spec.md §4.3
    /// security requirement).
    pub fn resolve_secure(&self, song_id: &str, relative: &str) -> Result<PathBuf> {
        if song_id.is_empty() || song_id.contains('/') || song_id.contains("..") {
            return Err(Error::AccessDenied(format!("invalid song id {song_id:?}")));
        }
        if relative.contains("..") {
            return Err(Error::AccessDenied(format!("invalid artifact name {relative:?}")));
        }
        let candidate = self.library_root.join(song_id).join(relative);
        let root = self
            .library_root
            .canonicalize()
            .unwrap_or_else(|_| self.library_root.clone());
        let resolved = candidate.canonicalize().unwrap_or_else(|_| candidate.clone());
        if !resolved.starts_with(&root) {
            return Err(Error::AccessDenied(format!(
                "path escapes library root: {}",
                candidate.display()
            )));
        }
        Ok(resolved)
    }

    /// Write `bytes` to `path` atomically: temp file in the same directory,
    /// `fsync`, then rename over the destination. Survives a crash mid-write
    /// without ever exposing a partial artifact.
    pub async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::StorageFailure(format!("artifact path has no parent: {}", path.display())))?;
        fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::StorageFailure(e.to_string()))?;
        let tmp_name = format!(
            ".{}.tmp",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact")
        );
        let tmp_path = dir.join(tmp_name);

        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| Error::StorageFailure(e.to_string()))?;
        file.write_all(bytes).await.map_err(|e| Error::StorageFailure(e.to_string()))?;
        file.sync_all().await.map_err(|e| Error::StorageFailure(e.to_string()))?;
        drop(file);
        fs::rename(&tmp_path, path).await.map_err(|e| Error::StorageFailure(e.to_string()))?;
        Ok(())
    }
}

/// Sniff the first bytes of downloaded image content for a recognizable
/// magic number, independent of the (possibly wrong) `Content-Type` header
/// a provider sent (spec.md §4.4).
pub fn sniff_image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
