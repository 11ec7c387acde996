// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable lyrics lookup, defaulting to the LRCLIB public API
//! (spec.md §4.5).

use async_trait::async_trait;
use oks_core::{Error, Result};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "OpenKaraokeStudio/0.1 (+https://openkaraoke.studio)";
const BASE_URL: &str = "https://lrclib.net";

/// Plain/synced lyrics for one track, as returned by a [`LyricsProvider`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LyricsResult {
    pub plain_lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

impl LyricsResult {
    pub fn is_empty(&self) -> bool {
        self.plain_lyrics.is_none() && self.synced_lyrics.is_none()
    }
}

/// A source of song lyrics. `SubprocessSeparator`-style trait seam so the
/// worker can be tested against a fake without reaching the network.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    async fn search(&self, artist: &str, title: &str, album: Option<&str>, duration_ms: Option<u64>) -> Result<LyricsResult>;
}

#[derive(Debug, Deserialize)]
struct LrclibResponse {
    #[serde(default)]
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
    #[serde(default)]
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
}

/// Default [`LyricsProvider`] backed by the LRCLIB public API.
pub struct LrclibClient {
    client: reqwest::Client,
}

impl LrclibClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LyricsProvider for LrclibClient {
    async fn search(&self, artist: &str, title: &str, album: Option<&str>, duration_ms: Option<u64>) -> Result<LyricsResult> {
        let mut query = vec![("track_name", title.to_string()), ("artist_name", artist.to_string())];
        if let Some(album) = album {
            query.push(("album_name", album.to_string()));
        }
        if let Some(duration_ms) = duration_ms {
            query.push(("duration", (duration_ms / 1000).to_string()));
        }

        let response = self
            .client
            .get(format!("{BASE_URL}/api/get"))
            .header("User-Agent", USER_AGENT)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(format!("lrclib get: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(LyricsResult::default());
        }
        if !response.status().is_success() {
            return Err(Error::ProviderFailure(format!("lrclib returned {}", response.status())));
        }

        let body: LrclibResponse = response
            .json()
            .await
            .map_err(|e| Error::ProviderFailure(format!("lrclib response: {e}")))?;

        Ok(LyricsResult {
            plain_lyrics: body.plain_lyrics,
            synced_lyrics: body.synced_lyrics,
        })
    }
}

/// Test double that returns a canned result without touching the network.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeLyricsProvider {
    pub result: LyricsResult,
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl LyricsProvider for FakeLyricsProvider {
    async fn search(&self, _artist: &str, _title: &str, _album: Option<&str>, _duration_ms: Option<u64>) -> Result<LyricsResult> {
        Ok(self.result.clone())
    }
}

#[cfg(test)]
#[path = "lyrics_tests.rs"]
mod tests;
