// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types published on the in-process event bus (spec.md §4.2).

mod bus;

pub use bus::{EventBus, JobEventSubscriber, PlayerEventSubscriber};

use crate::job::{Job, JobId};
use crate::performance::PerformanceState;
use serde::{Deserialize, Serialize};

/// Fired on every [`Job`] state transition. `was_created` distinguishes the
/// very first event (row just inserted) from subsequent updates, which is
/// how the WebSocket hub (spec.md §4.10) picks between
/// `job_created | job_updated | job_completed | job_failed | job_cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub job_id: JobId,
    pub job: Job,
    pub was_created: bool,
}

impl JobEvent {
    pub fn created(job: Job) -> Self {
        Self { job_id: job.id, was_created: true, job }
    }

    pub fn updated(job: Job) -> Self {
        Self { job_id: job.id, was_created: false, job }
    }

    /// The `jobs_updates` room event name this maps to (spec.md §4.10).
    pub fn room_event_name(&self) -> &'static str {
        use crate::job::JobStatus;
        if self.was_created {
            return "job_created";
        }
        match self.job.status {
            JobStatus::Completed => "job_completed",
            JobStatus::Failed => "job_failed",
            JobStatus::Cancelled => "job_cancelled",
            _ => "job_updated",
        }
    }
}

/// Events fanned out to the `/performance` room (spec.md §4.2, §4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerEvent {
    State { state: PerformanceState },
    Play,
    Pause,
    Reset,
    ControlUpdated { control: String, value: serde_json::Value },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
