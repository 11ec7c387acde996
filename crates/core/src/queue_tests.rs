// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn renumber_closes_gaps() {
    let mut items = vec![
        KaraokeQueueItem::builder().position(5).build(),
        KaraokeQueueItem::builder().position(9).build(),
        KaraokeQueueItem::builder().position(2).build(),
    ];
    renumber(&mut items);
    let positions: Vec<u32> = items.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn renumber_preserves_order() {
    let first = KaraokeQueueItem::builder().singer("first").build();
    let second = KaraokeQueueItem::builder().singer("second").build();
    let mut items = vec![first, second];
    renumber(&mut items);
    assert_eq!(items[0].singer, "first");
    assert_eq!(items[1].singer, "second");
}
