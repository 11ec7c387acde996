// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oks-core: domain types and pure logic for the Open Karaoke Studio job
//! pipeline — entities, the job state machine, the in-process event bus,
//! and the shared performance-control state. No I/O lives here; adapter
//! crates (`oks-storage`, `oks-adapters`, `oks-artifacts`) depend on this
//! crate, never the other way around.

pub mod macros;

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod job;
pub mod performance;
pub mod queue;
pub mod song;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{Error, Result};
pub use event::{EventBus, JobEvent, JobEventSubscriber, PlayerEvent, PlayerEventSubscriber};
pub use id::short;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobConfig, JobConfigBuilder, JobId, JobStatus};
#[cfg(any(test, feature = "test-support"))]
pub use queue::KaraokeQueueItemBuilder;
pub use queue::{renumber, KaraokeQueueItem, QueueItemId};
pub use performance::{PerformanceRoom, PerformanceState};
#[cfg(any(test, feature = "test-support"))]
pub use song::SongBuilder;
pub use song::{Song, SongId, SongSource};
pub use worker::WorkerId;
