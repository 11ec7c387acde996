// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    whole_percent = {"progress: 42%", Some(0.42)},
    padded = {"progress:  7% ", Some(0.07)},
    not_progress = {"loaded model bag", None},
    malformed = {"progress: abc%", None},
)]
fn parse_progress_line_cases(line: &str, expected: Option<f32>) {
    let got = parse_progress_line(line);
    match (got, expected) {
        (Some(g), Some(e)) => assert!((g - e).abs() < 1e-6),
        (None, None) => {}
        (g, e) => panic!("mismatch: got {g:?}, expected {e:?}"),
    }
}

#[tokio::test]
async fn null_separator_writes_both_stems() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("original.mp3");
    tokio::fs::write(&input, b"fake audio bytes").await.unwrap();

    let output_dir = dir.path().join("out");
    let reached_done = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = reached_done.clone();
    let callback: ProgressCallback = Box::new(move |p| {
        if p >= 1.0 {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });

    let separator = NullSeparator;
    let cancel = tokio_util::sync::CancellationToken::new();
    let result = separator.separate(&input, &output_dir, "mp3", &callback, &cancel).await.unwrap();

    assert!(result.vocals_path.exists());
    assert!(result.instrumental_path.exists());
    assert!(reached_done.load(std::sync::atomic::Ordering::SeqCst));
}
