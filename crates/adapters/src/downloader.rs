// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YouTube video download via `yt-dlp` (spec.md §4.7).

use async_trait::async_trait;
use oks_core::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;

#[allow(clippy::expect_used)]
fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:youtube|youtu|youtube-nocookie)\.(?:com|be)/(?:watch\?v=|embed/|v/|.+\?v=)?([^&=%?]{11})",
        )
        .expect("static regex is valid")
    })
}

/// Whether `input` looks like a YouTube URL (as opposed to a bare video id).
pub fn is_youtube_url(input: &str) -> bool {
    video_id_regex().is_match(input)
}

/// Extract the 11-character video id from a YouTube URL, if present.
pub fn extract_video_id(input: &str) -> Option<String> {
    video_id_regex().captures(input).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

/// Metadata extracted from a completed download.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    pub video_id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub channel_id: Option<String>,
    pub duration_ms: Option<u64>,
    pub upload_date: Option<String>,
    pub thumbnail_url: Option<String>,
    pub audio_path: PathBuf,
}

/// Downloads audio from a video-hosting provider and reports what it got.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn download(&self, video_id_or_url: &str, output_dir: &Path) -> Result<DownloadedVideo>;
}

/// Default [`VideoDownloader`], shelling out to `yt-dlp`.
///
/// Invokes `yt-dlp -x --audio-format mp3 -o <output_dir>/original.%(ext)s
/// --print "%(id)s|%(title)s|%(uploader)s|%(channel_id)s|%(duration)s|%(upload_date)s|%(thumbnail)s" <url>`
/// and parses the single `--print` line it emits after the download completes.
pub struct YtDlpDownloader {
    binary: String,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

const PRINT_TEMPLATE: &str = "%(id)s|%(title)s|%(uploader)s|%(channel_id)s|%(duration)s|%(upload_date)s|%(thumbnail)s";

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, video_id_or_url: &str, output_dir: &Path) -> Result<DownloadedVideo> {
        let url = if is_youtube_url(video_id_or_url) {
            video_id_or_url.to_string()
        } else {
            format!("https://www.youtube.com/watch?v={video_id_or_url}")
        };

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::StorageFailure(format!("create download dir: {e}")))?;

        let out_template = output_dir.join("original.%(ext)s");

        let thumbnail_template = format!("thumbnail:{}", output_dir.join("thumbnail.%(ext)s").display());

        let output = Command::new(&self.binary)
            .arg("-x")
            .arg("--audio-format")
            .arg("mp3")
            .arg("--audio-quality")
            .arg("0")
            .arg("-o")
            .arg(&out_template)
            .arg("--write-thumbnail")
            .arg("--convert-thumbnails")
            .arg("jpg")
            .arg("-o")
            .arg(&thumbnail_template)
            .arg("--no-playlist")
            .arg("--print")
            .arg(PRINT_TEMPLATE)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::DownloaderError(format!("failed to spawn {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::DownloaderError(format!("yt-dlp exited with {}: {stderr}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let print_line = stdout
            .lines()
            .rev()
            .find(|l| l.contains('|'))
            .ok_or_else(|| Error::DownloaderError("yt-dlp produced no --print output".to_string()))?;

        let mut fields = print_line.splitn(7, '|');
        let video_id = fields.next().unwrap_or_default().to_string();
        let title = fields.next().unwrap_or("Unknown Title").to_string();
        let uploader = non_na(fields.next());
        let channel_id = non_na(fields.next());
        let duration_seconds: Option<f64> = fields.next().and_then(|s| s.parse().ok());
        let upload_date = non_na(fields.next());
        let thumbnail_url = non_na(fields.next());

        let audio_path = output_dir.join("original.mp3");
        if !audio_path.exists() {
            return Err(Error::DownloaderError(format!(
                "yt-dlp reported success but {} is missing",
                audio_path.display()
            )));
        }

        Ok(DownloadedVideo {
            video_id,
            title,
            uploader,
            channel_id,
            duration_ms: duration_seconds.map(|s| (s * 1000.0) as u64),
            upload_date,
            thumbnail_url,
            audio_path,
        })
    }
}

/// yt-dlp prints the literal string `NA` for missing template fields.
fn non_na(field: Option<&str>) -> Option<String> {
    match field {
        Some(s) if !s.is_empty() && s != "NA" => Some(s.to_string()),
        _ => None,
    }
}

/// A canned [`VideoDownloader`] for tests. Writes `video.video_id` bytes
/// of silence to `original.mp3` under the requested output directory and
/// returns `video` with `audio_path` pointed at it.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeVideoDownloader {
    pub video: DownloadedVideo,
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl VideoDownloader for FakeVideoDownloader {
    async fn download(&self, _video_id_or_url: &str, output_dir: &Path) -> Result<DownloadedVideo> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::StorageFailure(format!("create download dir: {e}")))?;
        let audio_path = output_dir.join("original.mp3");
        tokio::fs::write(&audio_path, b"fake audio")
            .await
            .map_err(|e| Error::StorageFailure(format!("write fake audio: {e}")))?;
        Ok(DownloadedVideo {
            audio_path,
            ..self.video.clone()
        })
    }
}

#[cfg(test)]
#[path = "downloader_tests.rs"]
mod tests;
