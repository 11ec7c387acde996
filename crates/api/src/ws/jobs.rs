// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `jobs_updates` WebSocket room (spec.md §4.10).
//!
//! Each connected client gets its own outbound channel; a job event is
//! fanned out to every registered session. A session whose channel is full
//! or closed is dropped from the room rather than blocking the rest.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use oks_core::{JobEvent, JobEventSubscriber};
use oks_storage::JobFilter;
use oks_wire::{JobResponse, JobsServerMessage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

type SessionId = u64;

/// Registry of connected `/jobs` WebSocket sessions plus the `EventBus`
/// subscription that feeds them.
pub struct JobsHub {
    sessions: RwLock<HashMap<SessionId, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl JobsHub {
    pub fn new() -> Self {
        Self { sessions: RwLock::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }

    fn register(&self) -> (SessionId, mpsc::UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.write().insert(id, tx);
        (id, rx)
    }

    fn unregister(&self, id: SessionId) {
        self.sessions.write().remove(&id);
    }

    /// Send `payload` to exactly one session (used for the initial snapshot).
    fn send_to(&self, id: SessionId, payload: String) {
        if let Some(tx) = self.sessions.read().get(&id) {
            let _ = tx.send(payload);
        }
    }

    /// Fan `payload` out to every registered session. A session whose
    /// channel is gone is pruned; delivery to the rest continues regardless.
    fn broadcast(&self, payload: String) {
        let mut dead = Vec::new();
        {
            let sessions = self.sessions.read();
            for (id, tx) in sessions.iter() {
                if tx.send(payload.clone()).is_err() {
                    dead.push(*id);
                }
            }
        }
        if !dead.is_empty() {
            let mut sessions = self.sessions.write();
            for id in dead {
                sessions.remove(&id);
            }
        }
    }
}

impl Default for JobsHub {
    fn default() -> Self {
        Self::new()
    }
}

impl JobEventSubscriber for JobsHub {
    fn on_job_event(&self, event: &JobEvent) {
        let job = JobResponse::from(&event.job);
        let message = match event.room_event_name() {
            "job_created" => JobsServerMessage::JobCreated { job },
            "job_completed" => JobsServerMessage::JobCompleted { job },
            "job_failed" => JobsServerMessage::JobFailed { job },
            "job_cancelled" => JobsServerMessage::JobCancelled { job },
            _ => JobsServerMessage::JobUpdated { job },
        };
        match serde_json::to_string(&message) {
            Ok(payload) => self.broadcast(payload),
            Err(error) => tracing::error!(%error, "failed to serialize job event"),
        }
    }
}

/// Drives one accepted `/jobs` WebSocket connection: subscribes the
/// session, sends the initial snapshot, then relays broadcast messages
/// until the client disconnects.
pub async fn handle_socket(socket: WebSocket, state: crate::state::AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (session_id, mut rx) = state.jobs_hub.register();

    if let Err(error) = send_snapshot(&state, session_id).await {
        tracing::warn!(%error, "failed to build jobs snapshot");
    }

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Clients on this room are read-only; drain and discard any incoming
    // frames so the socket's read half doesn't back up, and treat a close
    // or error as disconnect.
    while let Some(frame) = receiver.next().await {
        if frame.is_err() {
            break;
        }
    }

    send_task.abort();
    state.jobs_hub.unregister(session_id);
}

async fn send_snapshot(state: &crate::state::AppState, session_id: SessionId) -> oks_core::Result<()> {
    let jobs = state.jobs.list(&JobFilter { dismissed: Some(false), ..JobFilter::default() }).await?;
    let message = JobsServerMessage::Snapshot { jobs: jobs.iter().map(JobResponse::from).collect() };
    if let Ok(text) = serde_json::to_string(&message) {
        state.jobs_hub.send_to(session_id, text);
    }
    Ok(())
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
