// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Outbound adapters for the karaoke pipeline: iTunes metadata enrichment,
//! LRCLIB lyrics lookup, demucs-style stem separation, and yt-dlp video
//! download (spec.md §4.4-§4.7).

pub mod downloader;
pub mod lyrics;
pub mod metadata;
pub mod separator;

pub use downloader::{extract_video_id, is_youtube_url, DownloadedVideo, VideoDownloader, YtDlpDownloader};
pub use lyrics::{LrclibClient, LyricsProvider, LyricsResult};
pub use metadata::{ItunesMatch, MetadataEnricher, MetadataProvider};
pub use separator::{ProgressCallback, SeparationOutput, StemSeparator, SubprocessSeparator};

#[cfg(any(test, feature = "test-support"))]
pub use downloader::FakeVideoDownloader;
#[cfg(any(test, feature = "test-support"))]
pub use lyrics::FakeLyricsProvider;
#[cfg(any(test, feature = "test-support"))]
pub use metadata::FakeMetadataProvider;
#[cfg(any(test, feature = "test-support"))]
pub use separator::NullSeparator;
