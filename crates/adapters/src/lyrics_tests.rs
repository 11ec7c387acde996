// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn lyrics_result_is_empty_when_both_fields_absent() {
    let result = LyricsResult::default();
    assert!(result.is_empty());
}

#[test]
fn lyrics_result_is_not_empty_with_plain_lyrics() {
    let result = LyricsResult {
        plain_lyrics: Some("la la la".into()),
        synced_lyrics: None,
    };
    assert!(!result.is_empty());
}

#[tokio::test]
async fn fake_provider_returns_canned_result() {
    let provider = FakeLyricsProvider {
        result: LyricsResult {
            plain_lyrics: Some("verse one".into()),
            synced_lyrics: None,
        },
    };
    let result = provider.search("Coldplay", "Yellow", None, None).await.unwrap();
    assert_eq!(result.plain_lyrics.as_deref(), Some("verse one"));
}
