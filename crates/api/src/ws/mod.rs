// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket upgrade routes (spec.md §4.10).

pub mod jobs;
pub mod performance;

use crate::state::AppState;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws/jobs", get(jobs_upgrade))
        .route("/ws/performance", get(performance_upgrade))
}

async fn jobs_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| jobs::handle_socket(socket, state))
}

async fn performance_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| performance::handle_socket(socket, state))
}
