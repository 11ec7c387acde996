// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable storage for jobs, songs, and the karaoke queue
//! (spec.md §4.1, §6).
//!
//! Every committing write runs inside a `sqlx::Transaction`; events are
//! published only once `tx.commit().await` has returned `Ok`, so a
//! subscriber reading the store back after receiving an event always sees
//! its own write (spec.md §4.1 durability contract).

pub mod jobs;
pub mod queue;
pub mod songs;

pub use jobs::{JobFilter, JobStats, JobStore};
pub use queue::QueueStore;
pub use songs::{SongFilter, SongStore};

use oks_core::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Owns the connection pool and the tuning pragmas spec.md §6 requires for
/// an embedded single-file database.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect, apply pragmas, and run pending migrations. `database_url`
    /// is a `sqlite://` URL; `sqlite::memory:` is accepted for tests.
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::StorageFailure(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| Error::StorageFailure(format!("connect: {e}")))?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await
            .map_err(|e| Error::StorageFailure(format!("set journal_mode: {e}")))?;
        sqlx::query("PRAGMA synchronous=FULL")
            .execute(&pool)
            .await
            .map_err(|e| Error::StorageFailure(format!("set synchronous: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::StorageFailure(format!("migrate: {e}")))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Explicit checkpoint after a committing write, so readers on other
    /// connections/processes observe it within bounded time even though WAL
    /// mode defers the main database file update (spec.md §4.1).
    pub(crate) async fn checkpoint_after_commit(&self) {
        if let Err(error) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)").execute(&self.pool).await {
            tracing::warn!(%error, "wal checkpoint failed");
        }
    }
}
