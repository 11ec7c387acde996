// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    validation = { Error::Validation("x".into()), "VALIDATION" },
    not_found = { Error::NotFound("x".into()), "NOT_FOUND" },
    conflict = { Error::Conflict("x".into()), "CONFLICT" },
    invalid_state = { Error::InvalidState("x".into()), "INVALID_STATE" },
    access_denied = { Error::AccessDenied("x".into()), "ACCESS_DENIED" },
    separation = { Error::SeparationError("x".into()), "SEPARATION_ERROR" },
    downloader = { Error::DownloaderError("x".into()), "DOWNLOADER_ERROR" },
    cancelled = { Error::Cancelled("x".into()), "CANCELLED" },
    internal = { Error::Internal("x".into()), "INTERNAL" },
)]
fn code_matches_variant(err: Error, expected: &str) {
    assert_eq!(err.code(), expected);
}

#[test]
fn display_includes_message() {
    let err = Error::NotFound("job-123".into());
    assert!(err.to_string().contains("job-123"));
}
