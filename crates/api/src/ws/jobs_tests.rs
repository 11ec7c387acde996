// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oks_core::{Job, JobEvent, JobStatus};

fn job_with_status(status: JobStatus) -> Job {
    let mut job = Job::builder().status(status).build();
    if status.is_terminal() {
        job.completed_at = Some(chrono::Utc::now());
    }
    job
}

#[tokio::test]
async fn broadcast_reaches_every_registered_session() {
    let hub = JobsHub::new();
    let (_id_a, mut rx_a) = hub.register();
    let (_id_b, mut rx_b) = hub.register();

    hub.broadcast("hello".to_string());

    assert_eq!(rx_a.recv().await.unwrap(), "hello");
    assert_eq!(rx_b.recv().await.unwrap(), "hello");
}

#[tokio::test]
async fn send_to_targets_a_single_session() {
    let hub = JobsHub::new();
    let (id_a, mut rx_a) = hub.register();
    let (_id_b, mut rx_b) = hub.register();

    hub.send_to(id_a, "only for a".to_string());

    assert_eq!(rx_a.recv().await.unwrap(), "only for a");
    // b's channel stays empty; dropping it here just proves no cross-talk.
    drop(rx_b);
}

#[tokio::test]
async fn broadcast_prunes_sessions_whose_receiver_is_gone() {
    let hub = JobsHub::new();
    let (_id, rx) = hub.register();
    drop(rx);
    assert_eq!(hub.sessions.read().len(), 1);

    hub.broadcast("anything".to_string());

    assert!(hub.sessions.read().is_empty());
}

#[tokio::test]
async fn unregister_removes_the_session() {
    let hub = JobsHub::new();
    let (id, _rx) = hub.register();
    assert_eq!(hub.sessions.read().len(), 1);

    hub.unregister(id);

    assert!(hub.sessions.read().is_empty());
}

#[tokio::test]
async fn on_job_event_maps_created_to_job_created() {
    let hub = JobsHub::new();
    let (_id, mut rx) = hub.register();

    hub.on_job_event(&JobEvent::created(job_with_status(JobStatus::Pending)));

    let payload = rx.recv().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value["event"], "job_created");
}

#[tokio::test]
async fn on_job_event_maps_terminal_statuses() {
    let hub = JobsHub::new();
    let (_id, mut rx) = hub.register();

    for (status, expected) in [
        (JobStatus::Completed, "job_completed"),
        (JobStatus::Failed, "job_failed"),
        (JobStatus::Cancelled, "job_cancelled"),
    ] {
        hub.on_job_event(&JobEvent::updated(job_with_status(status)));
        let payload = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["event"], expected, "status {status:?}");
    }
}

#[tokio::test]
async fn on_job_event_maps_non_terminal_update_to_job_updated() {
    let hub = JobsHub::new();
    let (_id, mut rx) = hub.register();

    hub.on_job_event(&JobEvent::updated(job_with_status(JobStatus::Processing)));

    let payload = rx.recv().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value["event"], "job_updated");
}
