// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Karaoke singer queue entity.

use crate::song::SongId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a queue entry.
    pub struct QueueItemId("que-");
}

/// One entry in the ordered singer queue. Ordered by `position`, dense but
/// re-assigned on reorder (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaraokeQueueItem {
    pub id: QueueItemId,
    pub song_id: SongId,
    pub singer: String,
    pub position: u32,
    pub added_at: chrono::DateTime<chrono::Utc>,
}

/// Reassign dense, zero-based positions to `items` in their current order.
/// Used after an insert, removal, or explicit reorder so positions never
/// develop gaps.
pub fn renumber(items: &mut [KaraokeQueueItem]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.position = i as u32;
    }
}

crate::builder! {
    pub struct KaraokeQueueItemBuilder => KaraokeQueueItem {
        set {
            id: QueueItemId = QueueItemId::new(),
            song_id: SongId = SongId::new(),
            position: u32 = 0,
        }
        into {
            singer: String = "Test Singer",
        }
        computed {
            added_at: chrono::DateTime<chrono::Utc> = chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
