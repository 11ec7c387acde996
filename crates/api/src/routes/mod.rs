// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP route modules, one per resource (spec.md §6).

pub mod health;
pub mod jobs;
pub mod queue;
pub mod songs;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(songs::router())
        .merge(jobs::router())
        .merge(queue::router())
}
