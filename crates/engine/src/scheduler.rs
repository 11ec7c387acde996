// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO job dispatch: submission, cancellation, and the fixed-size worker
//! pool that drains the queue (spec.md §4.9).

use crate::pipeline::{JobWorker, RunOutcome};
use oks_core::{Clock, Error, Job, JobConfig, JobId, JobStatus, Result};
use oks_storage::JobFilter;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Dispatches submitted jobs onto a bounded pool of concurrent workers,
/// preserving FIFO submission order (spec.md §4.9: "fixed-size pool of
/// workers", "in-process FIFO work queue").
pub struct Scheduler<C: Clock> {
    worker: Arc<JobWorker<C>>,
    queue_tx: mpsc::UnboundedSender<JobId>,
    cancels: Arc<RwLock<HashMap<JobId, CancellationToken>>>,
}

impl<C: Clock + 'static> Scheduler<C> {
    /// Build a scheduler and spawn its dispatcher loop. `pool_size` bounds
    /// how many jobs run concurrently; spec.md §4.9 defaults this to 1 on
    /// CPU-only hosts.
    pub fn new(worker: JobWorker<C>, pool_size: usize) -> Self {
        let worker = Arc::new(worker);
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let cancels = Arc::new(RwLock::new(HashMap::new()));

        let scheduler = Self { worker, queue_tx, cancels };
        scheduler.spawn_dispatcher(queue_rx, pool_size);
        scheduler
    }

    fn spawn_dispatcher(&self, mut queue_rx: mpsc::UnboundedReceiver<JobId>, pool_size: usize) {
        let worker = self.worker.clone();
        let cancels = self.cancels.clone();
        let semaphore = Arc::new(Semaphore::new(pool_size));

        tokio::spawn(async move {
            while let Some(job_id) = queue_rx.recv().await {
                let cancel = cancels.read().get(&job_id).cloned().unwrap_or_default();
                if cancel.is_cancelled() {
                    // Cancelled while still queued; cancel() already marked it terminal.
                    continue;
                }

                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let worker = worker.clone();
                let cancels = cancels.clone();
                tokio::spawn(async move {
                    let outcome = worker.run_job(job_id, cancel).await;
                    cancels.write().remove(&job_id);
                    match outcome {
                        RunOutcome::Completed => info!(job_id = %job_id, "job completed"),
                        RunOutcome::Cancelled => info!(job_id = %job_id, "job cancelled"),
                        RunOutcome::Failed => warn!(job_id = %job_id, "job failed"),
                    }
                    drop(permit);
                });
            }
        });
    }

    /// Create and persist a pending job, then enqueue it for dispatch
    /// (spec.md §4.9: `submit(job_spec) -> job_id`).
    pub async fn submit(&self, config: JobConfig) -> Result<Job> {
        let job = Job::new(config, &self.worker.clock);
        self.worker.jobs.create(&job).await?;

        self.cancels.write().insert(job.id, CancellationToken::new());
        self.queue_tx
            .send(job.id)
            .map_err(|_| Error::Internal("job dispatcher has shut down".to_string()))?;
        Ok(job)
    }

    /// Cancel a job by id. A still-pending job (never picked up by a
    /// worker) is marked cancelled directly; a running job has its token
    /// signalled and the worker notices at its next cancellation check
    /// (spec.md §4.9).
    pub async fn cancel(&self, job_id: &JobId) -> Result<()> {
        let mut job = self.worker.jobs.get(job_id).await?;
        if job.status.is_terminal() {
            return Err(Error::InvalidState(format!("job {job_id} is already terminal ({})", job.status)));
        }

        if let Some(token) = self.cancels.read().get(job_id).cloned() {
            token.cancel();
        }

        if job.status == JobStatus::Pending {
            job.cancel(&self.worker.clock);
            self.worker.jobs.update(&job).await?;
            // Leave the cancelled token in `cancels` (rather than removing
            // it) so the dispatcher's is_cancelled check still skips this
            // job if it had already been dequeued before this ran.
        }
        Ok(())
    }

    /// On startup, mark jobs stuck in a non-terminal state older than
    /// `threshold` as failed with a "resumed after restart" note. The
    /// pipeline never attempts mid-run resume (spec.md §4.9).
    pub async fn reconcile_stuck_jobs(&self, threshold: chrono::Duration) -> Result<usize> {
        let cutoff = self.worker.clock.now_utc() - threshold;
        let jobs = self.worker.jobs.list(&JobFilter::default()).await?;

        let mut reconciled = 0;
        for mut job in jobs {
            if job.status.is_terminal() || job.created_at > cutoff {
                continue;
            }
            warn!(job_id = %job.id, status = %job.status, "marking stuck job failed after restart");
            job.fail("resumed after restart", &self.worker.clock);
            self.worker.jobs.update(&job).await?;
            reconciled += 1;
        }
        Ok(reconciled)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
