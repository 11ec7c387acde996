// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn from_item_maps_all_fields() {
    let item = KaraokeQueueItem::builder().singer("Alice").position(3).build();
    let response = QueueItemResponse::from(&item);
    assert_eq!(response.singer, "Alice");
    assert_eq!(response.position, 3);
}

#[test]
fn reorder_request_deserializes_camel_case() {
    let json = r#"{"orderedIds":["que-a","que-b"]}"#;
    let req: ReorderQueueRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.ordered_ids, vec!["que-a", "que-b"]);
}
