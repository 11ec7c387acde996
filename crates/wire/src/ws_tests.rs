// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn update_performance_control_deserializes() {
    let json = r#"{"event":"update_performance_control","control":"vocal_volume","value":0.5}"#;
    let msg: PerformanceClientMessage = serde_json::from_str(json).unwrap();
    match msg {
        PerformanceClientMessage::UpdatePerformanceControl { control, value } => {
            assert_eq!(control, "vocal_volume");
            assert_eq!(value, serde_json::json!(0.5));
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn update_player_state_accepts_partial_fields() {
    let json = r#"{"event":"update_player_state","currentTime":12.5}"#;
    let msg: PerformanceClientMessage = serde_json::from_str(json).unwrap();
    match msg {
        PerformanceClientMessage::UpdatePlayerState { is_playing, current_time, duration } => {
            assert!(is_playing.is_none());
            assert_eq!(current_time, Some(12.5));
            assert!(duration.is_none());
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn playback_play_has_no_payload() {
    let json = r#"{"event":"playback_play"}"#;
    let msg: PerformanceClientMessage = serde_json::from_str(json).unwrap();
    assert!(matches!(msg, PerformanceClientMessage::PlaybackPlay));
}

#[test]
fn server_message_serializes_with_event_tag() {
    let msg = PerformanceServerMessage::ControlUpdated {
        control: "vocal_volume".to_string(),
        value: serde_json::json!(0.3),
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["event"], "control_updated");
    assert_eq!(json["control"], "vocal_volume");
}
