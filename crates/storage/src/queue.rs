// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable [`KaraokeQueueItem`] repository (spec.md §3).

use crate::Db;
use oks_core::{renumber, Clock, Error, KaraokeQueueItem, QueueItemId, Result, SongId};
use sqlx::Row;

pub struct QueueStore {
    db: Db,
}

impl QueueStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Append to the end of the queue, in a fresh `position` one past the
    /// current maximum.
    pub async fn push(&self, song_id: SongId, singer: impl Into<String>, clock: &impl Clock) -> Result<KaraokeQueueItem> {
        let max_position: Option<i64> = sqlx::query_scalar("SELECT MAX(position) FROM karaoke_queue")
            .fetch_one(self.db.pool())
            .await
            .map_err(storage_err)?;
        let item = KaraokeQueueItem {
            id: QueueItemId::new(),
            song_id,
            singer: singer.into(),
            position: max_position.map(|p| p + 1).unwrap_or(0) as u32,
            added_at: clock.now_utc(),
        };

        sqlx::query("INSERT INTO karaoke_queue (id, song_id, singer, position, added_at) VALUES (?, ?, ?, ?, ?)")
            .bind(item.id.as_str())
            .bind(item.song_id.as_str())
            .bind(&item.singer)
            .bind(item.position as i64)
            .bind(item.added_at)
            .execute(self.db.pool())
            .await
            .map_err(storage_err)?;

        self.db.checkpoint_after_commit().await;
        Ok(item)
    }

    pub async fn list(&self) -> Result<Vec<KaraokeQueueItem>> {
        let rows = sqlx::query("SELECT * FROM karaoke_queue ORDER BY position ASC")
            .fetch_all(self.db.pool())
            .await
            .map_err(storage_err)?;
        rows.iter().map(row_to_item).collect()
    }

    pub async fn remove(&self, id: &QueueItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM karaoke_queue WHERE id = ?")
            .bind(id.as_str())
            .execute(self.db.pool())
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("queue item {id}")));
        }
        self.renumber_all().await?;
        self.db.checkpoint_after_commit().await;
        Ok(())
    }

    /// Reassign dense, zero-based positions matching the queue's current
    /// ascending order. Called after any insert or removal so positions
    /// never develop gaps (spec.md §3).
    async fn renumber_all(&self) -> Result<()> {
        let mut items = self.list().await?;
        renumber(&mut items);
        for item in &items {
            sqlx::query("UPDATE karaoke_queue SET position = ? WHERE id = ?")
                .bind(item.position as i64)
                .bind(item.id.as_str())
                .execute(self.db.pool())
                .await
                .map_err(storage_err)?;
        }
        Ok(())
    }

    /// Apply an explicit full reorder, identified by the new ordering of
    /// ids. Every id in `order` must already be in the queue.
    pub async fn reorder(&self, order: &[QueueItemId]) -> Result<()> {
        for (position, id) in order.iter().enumerate() {
            let result = sqlx::query("UPDATE karaoke_queue SET position = ? WHERE id = ?")
                .bind(position as i64)
                .bind(id.as_str())
                .execute(self.db.pool())
                .await
                .map_err(storage_err)?;
            if result.rows_affected() == 0 {
                return Err(Error::NotFound(format!("queue item {id}")));
            }
        }
        self.db.checkpoint_after_commit().await;
        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> Error {
    Error::StorageFailure(e.to_string())
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<KaraokeQueueItem> {
    Ok(KaraokeQueueItem {
        id: QueueItemId::from_string(row.try_get::<String, _>("id").map_err(storage_err)?),
        song_id: SongId::from_string(row.try_get::<String, _>("song_id").map_err(storage_err)?),
        singer: row.try_get("singer").map_err(storage_err)?,
        position: row.try_get::<i64, _>("position").map_err(storage_err)? as u32,
        added_at: row.try_get("added_at").map_err(storage_err)?,
    })
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
