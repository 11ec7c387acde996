// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/queue` request/response DTOs (spec.md §3).

use oks_core::KaraokeQueueItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushQueueRequest {
    pub song_id: String,
    pub singer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderQueueRequest {
    pub ordered_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemResponse {
    pub id: String,
    pub song_id: String,
    pub singer: String,
    pub position: u32,
    pub added_at: chrono::DateTime<chrono::Utc>,
}

impl From<&KaraokeQueueItem> for QueueItemResponse {
    fn from(item: &KaraokeQueueItem) -> Self {
        Self {
            id: item.id.to_string(),
            song_id: item.song_id.to_string(),
            singer: item.singer.clone(),
            position: item.position,
            added_at: item.added_at,
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
