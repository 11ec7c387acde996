// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and state machine.

use crate::clock::Clock;
use crate::song::SongId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job attempt. Distinct from the [`SongId`] it
    /// targets — a song may accumulate several job attempts over time.
    pub struct JobId("job-");
}

/// Lifecycle state of a [`Job`].
///
/// Transitions follow the diagram in spec.md §4.8:
///
/// ```text
/// pending -> downloading -> processing -> finalizing -> completed
///    |           |               |              |
///    '-----------+---------------+--------------'
///                v
///          cancelled | failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Downloading,
    Processing,
    Finalizing,
    Completed,
    Cancelled,
    Failed,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Downloading => "downloading",
        Processing => "processing",
        Finalizing => "finalizing",
        Completed => "completed",
        Cancelled => "cancelled",
        Failed => "failed",
    }
}

impl JobStatus {
    /// Terminal statuses never transition further (spec.md §3 invariants).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed)
    }

    /// Whether `self -> next` is an allowed transition per the state diagram.
    /// Any non-terminal state may move to `cancelled` or `failed`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, JobStatus::Cancelled | JobStatus::Failed) {
            return true;
        }
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Downloading)
                | (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Downloading, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Finalizing)
                | (JobStatus::Finalizing, JobStatus::Completed)
        )
    }
}

/// Configuration for creating a new job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub id: JobId,
    pub song_id: SongId,
    pub filename: String,
}

impl JobConfig {
    pub fn builder(song_id: SongId, filename: impl Into<String>) -> JobConfigBuilder {
        JobConfigBuilder {
            id: JobId::new(),
            song_id,
            filename: filename.into(),
        }
    }
}

pub struct JobConfigBuilder {
    id: JobId,
    song_id: SongId,
    filename: String,
}

impl JobConfigBuilder {
    pub fn id(mut self, id: JobId) -> Self {
        self.id = id;
        self
    }

    pub fn build(self) -> JobConfig {
        JobConfig {
            id: self.id,
            song_id: self.song_id,
            filename: self.filename,
        }
    }
}

/// A single attempt to produce karaoke artifacts for a song.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub song_id: SongId,
    pub filename: String,
    pub status: JobStatus,
    /// Integer percent in `[0, 100]`. Monotonically non-decreasing within a
    /// single run (spec.md §3 invariant); enforced by [`Job::advance`].
    pub progress: u8,
    pub status_message: Option<String>,
    /// Opaque worker/thread identifier, for display only.
    pub task_id: Option<String>,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// UI-hidden but retained; only settable on terminal jobs.
    pub dismissed: bool,
    pub notes: Option<String>,
}

impl Job {
    pub fn new(config: JobConfig, clock: &impl Clock) -> Self {
        Self {
            id: config.id,
            song_id: config.song_id,
            filename: config.filename,
            status: JobStatus::Pending,
            progress: 0,
            status_message: None,
            task_id: None,
            error: None,
            created_at: clock.now_utc(),
            started_at: None,
            completed_at: None,
            dismissed: false,
            notes: None,
        }
    }

    /// Move to `next` status at `progress` percent, validating both the
    /// transition and progress monotonicity. Returns the previous status so
    /// callers can pick the right `JobEvent` variant.
    pub fn advance(
        &mut self,
        next: JobStatus,
        progress: u8,
        message: Option<String>,
        clock: &impl Clock,
    ) -> Result<JobStatus, crate::error::Error> {
        if !self.status.can_transition_to(next) {
            return Err(crate::error::Error::InvalidState(format!(
                "cannot transition job {} from {} to {}",
                self.id, self.status, next
            )));
        }
        if progress < self.progress {
            return Err(crate::error::Error::InvalidState(format!(
                "progress must not regress for job {} ({} -> {})",
                self.id, self.progress, progress
            )));
        }
        let previous = self.status;
        self.status = next;
        self.progress = progress.min(100);
        self.status_message = message;
        let now = clock.now_utc();
        if previous == JobStatus::Pending && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        Ok(previous)
    }

    /// Fail the job, recording the error and leaving artifacts in place
    /// (spec.md §4.8, §7: failure artifacts are kept for post-mortem).
    pub fn fail(&mut self, error: impl Into<String>, clock: &impl Clock) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(clock.now_utc());
    }

    /// Cancel the job (caller is responsible for deleting the song
    /// directory; spec.md §4.8).
    pub fn cancel(&mut self, clock: &impl Clock) {
        self.status = JobStatus::Cancelled;
        self.error = Some("Cancelled by user".to_string());
        self.completed_at = Some(clock.now_utc());
    }

    /// Mark dismissed; only valid for terminal statuses (spec.md §4.1).
    pub fn dismiss(&mut self) -> Result<(), crate::error::Error> {
        if !self.status.is_terminal() {
            return Err(crate::error::Error::InvalidState(format!(
                "job {} is not terminal (status={})",
                self.id, self.status
            )));
        }
        self.dismissed = true;
        Ok(())
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        set {
            id: JobId = JobId::new(),
            song_id: SongId = SongId::new(),
            status: JobStatus = JobStatus::Pending,
            progress: u8 = 0,
            dismissed: bool = false,
        }
        into {
            filename: String = "test.mp3",
        }
        option {
            status_message: String = None,
            task_id: String = None,
            error: String = None,
            notes: String = None,
        }
        computed {
            created_at: chrono::DateTime<chrono::Utc> = chrono::Utc::now(),
            started_at: Option<chrono::DateTime<chrono::Utc>> = None,
            completed_at: Option<chrono::DateTime<chrono::Utc>> = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
