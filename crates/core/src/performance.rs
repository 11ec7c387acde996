// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, in-memory performance-control state (spec.md §4.11).
//!
//! Exactly one authoritative [`PerformanceState`] exists per process, owned
//! by the `/performance` WebSocket room. Writes are serialized through
//! [`PerformanceRoom`]'s lock (spec.md §5: "mutated only from the
//! `/performance` handler context").

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The shared snapshot of the player controls for all connected clients.
/// Field defaults mirror `original_source`'s `global_performance_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceState {
    pub vocal_volume: f64,
    pub instrumental_volume: f64,
    pub lyrics_size: String,
    pub lyrics_offset: f64,
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self {
            vocal_volume: 0.0,
            instrumental_volume: 1.0,
            lyrics_size: "medium".to_string(),
            lyrics_offset: 0.0,
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
        }
    }
}

impl PerformanceState {
    /// Names of the fields `update_performance_control` is allowed to touch.
    /// Anything else is an unknown control: ignored with a warning, never a
    /// crash (spec.md §4.11).
    pub const KNOWN_CONTROLS: &'static [&'static str] = &[
        "vocal_volume",
        "instrumental_volume",
        "lyrics_size",
        "lyrics_offset",
    ];

    /// Apply `update_performance_control{control, value}`. Returns `true`
    /// when the control was recognized and applied.
    pub fn apply_control(&mut self, control: &str, value: &serde_json::Value) -> bool {
        match control {
            "vocal_volume" => match value.as_f64() {
                Some(v) => {
                    self.vocal_volume = v;
                    true
                }
                None => false,
            },
            "instrumental_volume" => match value.as_f64() {
                Some(v) => {
                    self.instrumental_volume = v;
                    true
                }
                None => false,
            },
            "lyrics_offset" => match value.as_f64() {
                Some(v) => {
                    self.lyrics_offset = v;
                    true
                }
                None => false,
            },
            "lyrics_size" => match value.as_str() {
                Some(s) => {
                    self.lyrics_size = s.to_string();
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Apply a `update_player_state{isPlaying?, currentTime?, duration?}`
    /// sync pulse: patch only the fields present, never rebroadcast as a
    /// control (spec.md §4.10).
    pub fn apply_player_state(&mut self, is_playing: Option<bool>, current_time: Option<f64>, duration: Option<f64>) {
        if let Some(v) = is_playing {
            self.is_playing = v;
        }
        if let Some(v) = current_time {
            self.current_time = v;
        }
        if let Some(v) = duration {
            self.duration = v;
        }
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
        self.is_playing = false;
    }
}

/// Single-writer, many-reader owner of the authoritative `PerformanceState`.
#[derive(Clone, Default)]
pub struct PerformanceRoom {
    state: Arc<Mutex<PerformanceState>>,
}

impl PerformanceRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PerformanceState {
        self.state.lock().clone()
    }

    /// Apply a control update; returns `true` if it was a recognized
    /// control (callers broadcast `control_updated` only on `true`).
    pub fn update_control(&self, control: &str, value: &serde_json::Value) -> bool {
        self.state.lock().apply_control(control, value)
    }

    pub fn update_player_state(&self, is_playing: Option<bool>, current_time: Option<f64>, duration: Option<f64>) {
        self.state.lock().apply_player_state(is_playing, current_time, duration);
    }

    pub fn set_playing(&self, playing: bool) {
        self.state.lock().is_playing = playing;
    }

    pub fn reset(&self) {
        self.state.lock().reset();
    }
}

#[cfg(test)]
#[path = "performance_tests.rs"]
mod tests;
