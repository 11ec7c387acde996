// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_song_has_no_audio_files() {
    let song = Song::new(SongId::new(), "t", "a", SongSource::Upload, chrono::Utc::now());
    assert!(!song.has_audio_files);
    assert!(song.vocals_path.is_none());
}

#[test]
fn refresh_has_audio_files_requires_both_stems() {
    let mut song = Song::builder().build();
    song.vocals_path = Some("vocals.mp3".into());
    song.refresh_has_audio_files();
    assert!(!song.has_audio_files, "only vocals present");

    song.instrumental_path = Some("instrumental.mp3".into());
    song.refresh_has_audio_files();
    assert!(song.has_audio_files);
}

#[test]
fn builder_defaults_are_sane() {
    let song = Song::builder().build();
    assert_eq!(song.title, "Test Title");
    assert_eq!(song.source, SongSource::Upload);
}
