// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `global_performance_controls` WebSocket room (spec.md §4.10-§4.11).

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use oks_wire::{PerformanceClientMessage, PerformanceServerMessage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

type SessionId = u64;

/// Registry of connected `/performance` sessions. Unlike [`super::jobs::JobsHub`]
/// this room is also a message sink: incoming client messages mutate the
/// shared `PerformanceRoom` and are rebroadcast.
pub struct PerformanceHub {
    sessions: RwLock<HashMap<SessionId, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl PerformanceHub {
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

    fn send_to(&self, id: SessionId, payload: &str) {
        if let Some(tx) = self.sessions.read().get(&id) {
            let _ = tx.send(payload.to_string());
        }
    }

    /// Broadcast to every session, optionally skipping `exclude`
    /// (`update_performance_control` never echoes back to its sender).
    fn broadcast(&self, payload: &str, exclude: Option<SessionId>) {
        let mut dead = Vec::new();
        {
            let sessions = self.sessions.read();
            for (id, tx) in sessions.iter() {
                if Some(*id) == exclude {
                    continue;
                }
                if tx.send(payload.to_string()).is_err() {
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

impl Default for PerformanceHub {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(message: &PerformanceServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(error) => {
            tracing::error!(%error, "failed to serialize performance message");
            None
        }
    }
}

pub async fn handle_socket(socket: WebSocket, state: crate::state::AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (session_id, mut rx) = state.performance_hub.register();

    let snapshot = PerformanceServerMessage::PerformanceState { state: state.performance.snapshot() };
    if let Some(payload) = encode(&snapshot) {
        state.performance_hub.send_to(session_id, &payload);
    }

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let Message::Text(text) = frame else { continue };
        let Ok(client_message) = serde_json::from_str::<PerformanceClientMessage>(&text) else {
            tracing::warn!(payload = %text, "ignoring unrecognized performance message");
            continue;
        };
        handle_client_message(&state, session_id, client_message);
    }

    send_task.abort();
    state.performance_hub.unregister(session_id);
}

fn handle_client_message(state: &crate::state::AppState, session_id: SessionId, message: PerformanceClientMessage) {
    match message {
        PerformanceClientMessage::JoinPerformance | PerformanceClientMessage::LeavePerformance => {
            // Membership is already tracked by the socket connection itself.
        }
        PerformanceClientMessage::UpdatePerformanceControl { control, value } => {
            if !state.performance.update_control(&control, &value) {
                tracing::warn!(%control, "ignoring unknown performance control");
                return;
            }
            if let Some(payload) = encode(&PerformanceServerMessage::ControlUpdated { control, value }) {
                state.performance_hub.broadcast(&payload, Some(session_id));
            }
        }
        PerformanceClientMessage::PlaybackPlay => {
            state.performance.set_playing(true);
            broadcast_command(state, PerformanceServerMessage::PlaybackPlay);
            broadcast_state(state);
        }
        PerformanceClientMessage::PlaybackPause => {
            state.performance.set_playing(false);
            broadcast_command(state, PerformanceServerMessage::PlaybackPause);
            broadcast_state(state);
        }
        PerformanceClientMessage::UpdatePlayerState { is_playing, current_time, duration } => {
            state.performance.update_player_state(is_playing, current_time, duration);
        }
        PerformanceClientMessage::ResetPlayerState => {
            state.performance.reset();
            broadcast_command(state, PerformanceServerMessage::ResetPlayerState);
            broadcast_state(state);
        }
    }
}

/// Playback commands go to every session, including the one that sent them,
/// so all clients' transports stay in lockstep (spec.md §4.10).
fn broadcast_command(state: &crate::state::AppState, message: PerformanceServerMessage) {
    if let Some(payload) = encode(&message) {
        state.performance_hub.broadcast(&payload, None);
    }
}

fn broadcast_state(state: &crate::state::AppState) {
    let message = PerformanceServerMessage::PerformanceState { state: state.performance.snapshot() };
    if let Some(payload) = encode(&message) {
        state.performance_hub.broadcast(&payload, None);
    }
}

#[cfg(test)]
#[path = "performance_tests.rs"]
mod tests;
