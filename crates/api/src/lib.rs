// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oks-api: the HTTP/WebSocket surface for the Open Karaoke Studio job
//! pipeline (spec.md §6). Thin by design: every handler delegates to
//! `oks-storage`, `oks-engine`, or `oks-artifacts` and only shapes
//! requests/responses and enforces the path-traversal rejection that spec.md
//! §6 carves out from the generic error mapping.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::Config;
pub use state::AppState;
