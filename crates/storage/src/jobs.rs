// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable [`Job`] repository (spec.md §4.1).

use crate::Db;
use oks_core::{Error, EventBus, Job, JobEvent, JobId, JobStatus, Result, SongId};
use sqlx::Row;
use std::sync::Arc;

/// Filter for `list`. `None` fields are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub dismissed: Option<bool>,
    pub since: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct JobStats {
    pub pending: i64,
    pub downloading: i64,
    pub processing: i64,
    pub finalizing: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub failed: i64,
}

pub struct JobStore {
    db: Db,
    events: Arc<EventBus>,
}

impl JobStore {
    pub fn new(db: Db, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    /// Insert a new job row. `Conflict` if `job.id` already exists. Emits
    /// `JobEvent{was_created: true}` after the transaction commits.
    pub async fn create(&self, job: &Job) -> Result<()> {
        let mut tx = self.db.pool().begin().await.map_err(storage_err)?;

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = ?")
            .bind(job.id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?;
        if exists.is_some() {
            return Err(Error::Conflict(format!("job {} already exists", job.id)));
        }

        sqlx::query(
            "INSERT INTO jobs
                (id, song_id, filename, status, progress, status_message, task_id, error, notes, dismissed, created_at, started_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.id.as_str())
        .bind(job.song_id.as_str())
        .bind(&job.filename)
        .bind(job.status.to_string())
        .bind(job.progress as i64)
        .bind(&job.status_message)
        .bind(&job.task_id)
        .bind(&job.error)
        .bind(&job.notes)
        .bind(job.dismissed)
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        self.db.checkpoint_after_commit().await;
        self.events.publish_job(JobEvent::created(job.clone()));
        Ok(())
    }

    pub async fn get(&self, id: &JobId) -> Result<Job> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.db.pool())
            .await
            .map_err(storage_err)?
            .ok_or_else(|| Error::NotFound(format!("job {id}")))?;
        row_to_job(&row)
    }

    /// Persist a full job snapshot; verifies the row still exists. Emits
    /// `job_updated`/`job_completed`/`job_failed`/`job_cancelled` depending
    /// on the new status (see [`JobEvent::room_event_name`]).
    pub async fn update(&self, job: &Job) -> Result<()> {
        let mut tx = self.db.pool().begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            "UPDATE jobs SET
                status = ?, progress = ?, status_message = ?, task_id = ?,
                error = ?, notes = ?, dismissed = ?, started_at = ?, completed_at = ?
             WHERE id = ?",
        )
        .bind(job.status.to_string())
        .bind(job.progress as i64)
        .bind(&job.status_message)
        .bind(&job.task_id)
        .bind(&job.error)
        .bind(&job.notes)
        .bind(job.dismissed)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("job {}", job.id)));
        }

        tx.commit().await.map_err(storage_err)?;
        self.db.checkpoint_after_commit().await;
        self.events.publish_job(JobEvent::updated(job.clone()));
        Ok(())
    }

    /// Mark dismissed. Only valid for terminal statuses (spec.md §4.1).
    pub async fn dismiss(&self, id: &JobId) -> Result<()> {
        let mut job = self.get(id).await?;
        job.dismiss()?;

        let result = sqlx::query("UPDATE jobs SET dismissed = 1 WHERE id = ?")
            .bind(id.as_str())
            .execute(self.db.pool())
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("job {id}")));
        }
        self.db.checkpoint_after_commit().await;
        Ok(())
    }

    /// Ordered by `created_at` descending (spec.md §4.1).
    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let mut query = String::from("SELECT * FROM jobs WHERE 1=1");
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filter.dismissed.is_some() {
            query.push_str(" AND dismissed = ?");
        }
        if filter.since.is_some() {
            query.push_str(" AND created_at >= ?");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.to_string());
        }
        if let Some(dismissed) = filter.dismissed {
            q = q.bind(dismissed);
        }
        if let Some(since) = filter.since {
            q = q.bind(since);
        }

        let rows = q.fetch_all(self.db.pool()).await.map_err(storage_err)?;
        rows.iter().map(row_to_job).collect()
    }

    pub async fn stats(&self) -> Result<JobStats> {
        let rows = sqlx::query("SELECT status, COUNT(*) as count FROM jobs GROUP BY status")
            .fetch_all(self.db.pool())
            .await
            .map_err(storage_err)?;

        let mut stats = JobStats::default();
        for row in rows {
            let status: String = row.try_get("status").map_err(storage_err)?;
            let count: i64 = row.try_get("count").map_err(storage_err)?;
            match status.as_str() {
                "pending" => stats.pending = count,
                "downloading" => stats.downloading = count,
                "processing" => stats.processing = count,
                "finalizing" => stats.finalizing = count,
                "completed" => stats.completed = count,
                "cancelled" => stats.cancelled = count,
                "failed" => stats.failed = count,
                _ => {}
            }
        }
        Ok(stats)
    }
}

fn storage_err(e: sqlx::Error) -> Error {
    Error::StorageFailure(e.to_string())
}

fn parse_status(raw: &str) -> Result<JobStatus> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "downloading" => Ok(JobStatus::Downloading),
        "processing" => Ok(JobStatus::Processing),
        "finalizing" => Ok(JobStatus::Finalizing),
        "completed" => Ok(JobStatus::Completed),
        "cancelled" => Ok(JobStatus::Cancelled),
        "failed" => Ok(JobStatus::Failed),
        other => Err(Error::StorageFailure(format!("unknown job status in row: {other}"))),
    }
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<Job> {
    let status_raw: String = row.try_get("status").map_err(storage_err)?;
    Ok(Job {
        id: JobId::from_string(row.try_get::<String, _>("id").map_err(storage_err)?),
        song_id: SongId::from_string(row.try_get::<String, _>("song_id").map_err(storage_err)?),
        filename: row.try_get("filename").map_err(storage_err)?,
        status: parse_status(&status_raw)?,
        progress: row.try_get::<i64, _>("progress").map_err(storage_err)? as u8,
        status_message: row.try_get("status_message").map_err(storage_err)?,
        task_id: row.try_get("task_id").map_err(storage_err)?,
        error: row.try_get("error").map_err(storage_err)?,
        notes: row.try_get("notes").map_err(storage_err)?,
        dismissed: row.try_get("dismissed").map_err(storage_err)?,
        created_at: row.try_get("created_at").map_err(storage_err)?,
        started_at: row.try_get("started_at").map_err(storage_err)?,
        completed_at: row.try_get("completed_at").map_err(storage_err)?,
    })
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
