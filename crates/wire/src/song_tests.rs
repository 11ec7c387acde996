// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn from_song_maps_all_fields() {
    let song = Song::builder().title("Title").artist("Artist").build();
    let response = SongResponse::from(&song);
    assert_eq!(response.id, song.id.to_string());
    assert_eq!(response.title, "Title");
    assert_eq!(response.source, SongSource::Upload);
}

#[test]
fn create_song_request_deserializes_camel_case() {
    let json = r#"{"title":"T","artist":"A","durationMs":1000,"videoId":"abc123"}"#;
    let req: CreateSongRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.duration_ms, Some(1000));
    assert_eq!(req.video_id.as_deref(), Some("abc123"));
    assert!(req.album.is_none());
}
