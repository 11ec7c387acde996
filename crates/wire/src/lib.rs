// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oks-wire: HTTP/WebSocket DTOs and the `ApiError` → HTTP mapping
//! (spec.md §6, §7). Kept separate from `oks-core` so domain types never
//! carry serde `rename_all = "camelCase"` attributes driven by the wire
//! format.

pub mod error;
pub mod job;
pub mod queue;
pub mod song;
pub mod ws;

pub use error::ApiError;
pub use job::{JobListQuery, JobResponse, YoutubeDownloadRequest, YoutubeDownloadResponse};
pub use queue::{PushQueueRequest, QueueItemResponse, ReorderQueueRequest};
pub use song::{CreateSongRequest, SongListQuery, SongResponse, UpdateSongRequest};
pub use ws::{JobsServerMessage, PerformanceClientMessage, PerformanceServerMessage};
