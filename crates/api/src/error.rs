// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API-layer error shaping beyond the generic `oks_wire::ApiError` mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// `GET /api/songs/:id/download/:track` and the thumbnail/cover endpoints
/// reject any path that would resolve outside the library root with this
/// shape rather than the generic `AccessDenied` (403) mapping, matching
/// spec.md §6: "400 with code=SECURITY_VIOLATION".
pub fn security_violation(detail: impl Into<String>) -> Response {
    let body = json!({
        "error": detail.into(),
        "code": "SECURITY_VIOLATION",
        "details": {},
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Raw song-id path segments are validated before they ever reach a store
/// lookup, since a traversal attempt (`../etc`) is not a valid id and would
/// otherwise just surface as a confusing 404.
pub fn reject_unsafe_song_id(song_id: &str) -> Option<Response> {
    if song_id.is_empty() || song_id.contains('/') || song_id.contains("..") {
        return Some(security_violation(format!("invalid song id: {song_id:?}")));
    }
    None
}
