// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn default_state_matches_baseline() {
    let state = PerformanceState::default();
    assert_eq!(state.vocal_volume, 0.0);
    assert_eq!(state.instrumental_volume, 1.0);
    assert_eq!(state.lyrics_size, "medium");
    assert!(!state.is_playing);
}

#[test]
fn apply_control_updates_known_field() {
    let mut state = PerformanceState::default();
    assert!(state.apply_control("vocal_volume", &json!(0.3)));
    assert_eq!(state.vocal_volume, 0.3);
}

#[test]
fn apply_control_ignores_unknown_field() {
    let mut state = PerformanceState::default();
    let before = state.clone();
    assert!(!state.apply_control("bass_boost", &json!(1.0)));
    assert_eq!(state, before);
}

#[test]
fn apply_player_state_patches_only_present_fields() {
    let mut state = PerformanceState::default();
    state.duration = 120.0;
    state.apply_player_state(Some(true), Some(5.0), None);
    assert!(state.is_playing);
    assert_eq!(state.current_time, 5.0);
    assert_eq!(state.duration, 120.0, "duration untouched when absent");
}

#[test]
fn reset_clears_time_and_playback() {
    let mut state = PerformanceState::default();
    state.current_time = 42.0;
    state.is_playing = true;
    state.reset();
    assert_eq!(state.current_time, 0.0);
    assert!(!state.is_playing);
}

#[test]
fn room_update_control_returns_false_for_unknown() {
    let room = PerformanceRoom::new();
    assert!(!room.update_control("nonsense", &json!(1)));
    assert!(room.update_control("vocal_volume", &json!(0.5)));
    assert_eq!(room.snapshot().vocal_volume, 0.5);
}

#[test]
fn room_is_shared_across_clones() {
    let room = PerformanceRoom::new();
    let other = room.clone();
    other.set_playing(true);
    assert!(room.snapshot().is_playing);
}
