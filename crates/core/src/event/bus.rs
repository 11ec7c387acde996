// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous in-process pub/sub (spec.md §4.2).
//!
//! `publish` calls every subscriber inline, on the publisher's own thread,
//! in registration order. There is no queue and no backpressure: a slow
//! subscriber makes the publisher slow. This is a deliberate departure from
//! `tokio::sync::broadcast` (which drops lagging subscribers instead of
//! blocking) because spec.md §4.2 requires every subscriber to observe
//! every event.

use super::{JobEvent, PlayerEvent};
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

pub trait JobEventSubscriber: Send + Sync {
    fn on_job_event(&self, event: &JobEvent);
}

pub trait PlayerEventSubscriber: Send + Sync {
    fn on_player_event(&self, event: &PlayerEvent);
}

/// Owns the subscriber lists and fans events out synchronously.
#[derive(Default)]
pub struct EventBus {
    job_subscribers: RwLock<Vec<Arc<dyn JobEventSubscriber>>>,
    player_subscribers: RwLock<Vec<Arc<dyn PlayerEventSubscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_jobs(&self, subscriber: Arc<dyn JobEventSubscriber>) {
        self.job_subscribers.write().push(subscriber);
    }

    pub fn subscribe_player(&self, subscriber: Arc<dyn PlayerEventSubscriber>) {
        self.player_subscribers.write().push(subscriber);
    }

    /// Fan `event` out to every job subscriber. A subscriber that panics is
    /// caught and logged; it never takes down the publisher or the
    /// remaining subscribers.
    pub fn publish_job(&self, event: JobEvent) {
        let subscribers = self.job_subscribers.read().clone();
        for subscriber in subscribers {
            let event_ref = &event;
            let result = catch_unwind(AssertUnwindSafe(|| subscriber.on_job_event(event_ref)));
            if let Err(panic) = result {
                error!(job_id = %event.job_id, panic = panic_message(&panic), "job event subscriber panicked");
            }
        }
    }

    pub fn publish_player(&self, event: PlayerEvent) {
        let subscribers = self.player_subscribers.read().clone();
        for subscriber in subscribers {
            let event_ref = &event;
            let result = catch_unwind(AssertUnwindSafe(|| subscriber.on_player_event(event_ref)));
            if let Err(panic) = result {
                error!(panic = panic_message(&panic), "player event subscriber panicked");
            }
        }
    }
}

/// `catch_unwind` yields `Box<dyn Any + Send>`, which has no `Debug` impl;
/// pull the usual `&str`/`String` payload out of it for logging.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("panic")
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
