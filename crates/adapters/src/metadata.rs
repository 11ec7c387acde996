// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! iTunes Search API metadata enrichment (spec.md §4.4).
//!
//! Searches for a canonical release, ranks candidates to avoid compilation
//! and karaoke-cover albums, and downloads the highest-resolution cover art
//! it can find.

use async_trait::async_trait;
use oks_artifacts::{sniff_image_extension, ArtifactLayout};
use oks_core::{Error, Result, SongId};
use serde::Deserialize;

const SEARCH_URL: &str = "https://itunes.apple.com/search";

/// Album-name substrings that demote a track during ranking (case-insensitive).
const COMPILATION_KEYWORDS: &[&str] = &[
    "greatest hits",
    "best of",
    "compilation",
    "collection",
    "anthology",
    "live",
    "karaoke",
    "tribute",
    "cover",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawTrack>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTrack {
    #[serde(rename = "trackId")]
    track_id: Option<i64>,
    #[serde(rename = "trackName")]
    track_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "artistId")]
    artist_id: Option<i64>,
    #[serde(rename = "collectionName")]
    collection_name: Option<String>,
    #[serde(rename = "releaseDate")]
    release_date: Option<String>,
    #[serde(rename = "primaryGenreName")]
    genre: Option<String>,
    #[serde(rename = "trackTimeMillis")]
    duration_ms: Option<u64>,
    #[serde(rename = "artworkUrl30")]
    artwork_url_30: Option<String>,
    #[serde(rename = "artworkUrl60")]
    artwork_url_60: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
    #[serde(rename = "isStreamable", default)]
    is_streamable: bool,
    #[serde(rename = "trackExplicitness")]
    track_explicitness: Option<String>,
}

/// A ranked iTunes match, trimmed to the fields the karaoke library stores.
#[derive(Debug, Clone)]
pub struct ItunesMatch {
    pub track_id: Option<i64>,
    pub title: String,
    pub artist: String,
    pub artist_id: Option<i64>,
    pub album: Option<String>,
    pub release_date: Option<String>,
    pub genre: Option<String>,
    pub duration_ms: Option<u64>,
    pub artwork_url: Option<String>,
    pub is_streamable: bool,
    pub explicit: bool,
}

impl From<RawTrack> for ItunesMatch {
    fn from(t: RawTrack) -> Self {
        let artwork_url = t.artwork_url_100.or(t.artwork_url_60).or(t.artwork_url_30);
        Self {
            track_id: t.track_id,
            title: t.track_name.unwrap_or_default(),
            artist: t.artist_name.unwrap_or_default(),
            artist_id: t.artist_id,
            album: t.collection_name,
            release_date: t.release_date,
            genre: t.genre,
            duration_ms: t.duration_ms,
            artwork_url,
            is_streamable: t.is_streamable,
            explicit: t.track_explicitness.as_deref() == Some("explicit"),
        }
    }
}

/// Looks up canonical release metadata and cover art for a song.
///
/// `MetadataEnricher` is the production implementation, backed by the
/// iTunes Search API; tests substitute [`FakeMetadataProvider`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search(&self, artist: &str, title: &str, album: Option<&str>, limit: usize) -> Result<Vec<ItunesMatch>>;

    async fn download_cover_art(&self, song_id: &SongId, m: &ItunesMatch) -> Result<Option<String>>;
}

/// Enriches song metadata from the iTunes Search API and fetches cover art.
pub struct MetadataEnricher {
    client: reqwest::Client,
    layout: ArtifactLayout,
}

impl MetadataEnricher {
    pub fn new(client: reqwest::Client, layout: ArtifactLayout) -> Self {
        Self { client, layout }
    }

    async fn try_download_cover(&self, song_id: &SongId, url: &str) -> Result<Option<String>> {
        let response = match self.client.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            _ => return Ok(None),
        };
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(_) => return Ok(None),
        };
        let Some(ext) = sniff_image_extension(&bytes) else {
            return Ok(None);
        };
        let dest = self.layout.song_dir(song_id).await?.join(format!("cover.{ext}"));
        self.layout.write_atomic(&dest, &bytes).await?;
        Ok(Some(format!("cover.{ext}")))
    }

    /// Run one search tier against the iTunes API and rank the results.
    /// `rank_artist`/`rank_title` are always the original query terms, even
    /// when the tier itself narrowed the search string (spec.md §4.4).
    async fn search_tier(&self, terms: &[&str], rank_artist: &str, rank_title: &str, limit: usize) -> Result<Vec<ItunesMatch>> {
        let query = terms.iter().filter(|t| !t.is_empty()).copied().collect::<Vec<_>>().join(" ");
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("term", query.as_str()),
                ("entity", "song"),
                ("media", "music"),
                ("limit", &(limit.clamp(1, 10) * 5).min(50).to_string()),
                ("country", "US"),
            ])
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(format!("itunes search: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::ProviderFailure(format!("itunes search returned {}", response.status())));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::ProviderFailure(format!("itunes search response: {e}")))?;

        let mut matches: Vec<ItunesMatch> = body.results.into_iter().map(ItunesMatch::from).collect();
        rank_canonical(&mut matches, rank_artist, rank_title);
        matches.truncate(limit);
        Ok(matches)
    }
}

#[async_trait]
impl MetadataProvider for MetadataEnricher {
    /// Search iTunes in three progressively broader tiers, stopping at the
    /// first that returns anything (spec.md §4.4): specific (artist+title+
    /// album), broad (artist+title), then title-only.
    async fn search(&self, artist: &str, title: &str, album: Option<&str>, limit: usize) -> Result<Vec<ItunesMatch>> {
        let album = album.filter(|a| !a.is_empty());

        if let Some(album) = album {
            let matches = self.search_tier(&[artist, title, album], artist, title, limit).await?;
            if !matches.is_empty() {
                return Ok(matches);
            }
        }

        if !artist.is_empty() {
            let matches = self.search_tier(&[artist, title], artist, title, limit).await?;
            if !matches.is_empty() {
                return Ok(matches);
            }
        }

        self.search_tier(&[title], artist, title, limit).await
    }

    /// Download the best available artwork for `song_id`, trying 600x600
    /// first and falling back to whatever size the provider offered.
    async fn download_cover_art(&self, song_id: &SongId, m: &ItunesMatch) -> Result<Option<String>> {
        let Some(artwork_url) = &m.artwork_url else {
            return Ok(None);
        };

        let high_res = upsize_artwork_url(artwork_url);
        if let Some(path) = self.try_download_cover(song_id, &high_res).await? {
            return Ok(Some(path));
        }
        self.try_download_cover(song_id, artwork_url).await
    }
}

/// Rewrite a `NNxNNbb.jpg` iTunes artwork URL to request the 600x600 render.
fn upsize_artwork_url(url: &str) -> String {
    url.replace("100x100bb.jpg", "600x600bb.jpg")
        .replace("60x60bb.jpg", "600x600bb.jpg")
        .replace("30x30bb.jpg", "600x600bb.jpg")
}

/// Score and sort matches to prefer canonical studio releases over
/// compilations, karaoke covers, and tribute albums.
fn rank_canonical(matches: &mut [ItunesMatch], artist_query: &str, title_query: &str) {
    let artist_query = artist_query.to_lowercase();
    let title_query = title_query.to_lowercase();

    let mut scored: Vec<(f64, usize)> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| (score_match(m, &artist_query, &title_query), i))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let reordered: Vec<ItunesMatch> = scored.into_iter().map(|(_, i)| matches[i].clone()).collect();
    matches.clone_from_slice(&reordered);
}

fn score_match(m: &ItunesMatch, artist_query: &str, title_query: &str) -> f64 {
    let mut score = 0.0;
    let title = m.title.to_lowercase();
    let artist = m.artist.to_lowercase();
    let album = m.album.as_deref().unwrap_or_default().to_lowercase();

    if title == *title_query {
        score += 50.0;
    } else if title.contains(title_query) {
        score += 25.0;
    }

    if artist == *artist_query {
        score += 30.0;
    } else if artist.contains(artist_query) {
        score += 15.0;
    }

    if !COMPILATION_KEYWORDS.iter().any(|kw| album.contains(kw)) {
        score += 20.0;
    }

    if m.is_streamable {
        score += 10.0;
    }

    if !m.explicit {
        score += 5.0;
    }

    score
}

/// A canned [`MetadataProvider`] for tests.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeMetadataProvider {
    pub matches: Vec<ItunesMatch>,
    pub cover_art: Option<String>,
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl MetadataProvider for FakeMetadataProvider {
    async fn search(&self, _artist: &str, _title: &str, _album: Option<&str>, limit: usize) -> Result<Vec<ItunesMatch>> {
        let mut matches = self.matches.clone();
        matches.truncate(limit);
        Ok(matches)
    }

    async fn download_cover_art(&self, _song_id: &SongId, _m: &ItunesMatch) -> Result<Option<String>> {
        Ok(self.cover_art.clone())
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
