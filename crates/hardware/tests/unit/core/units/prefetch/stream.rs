//! Stream Buffer Unit Tests.
//!
//! Verifies buffer fills, transfers (shift and tail refill), LRU replacement of
//! buffers and the MRU ordering used for the contents dump.

use cachesim_core::common::addr::BlockId;
use cachesim_core::core::units::prefetch::StreamBufferArray;

fn entries(unit: &StreamBufferArray, idx: usize) -> Vec<u32> {
    unit.buffer(idx).entries().iter().map(|e| e.val()).collect()
}

#[test]
fn new_unit_is_invalid() {
    let unit = StreamBufferArray::new(3, 4);
    assert_eq!(unit.count(), 3);
    assert_eq!(unit.depth(), 4);
    assert!(unit.buffers().iter().all(|b| !b.is_valid()));
    assert!(unit.mru().is_none());
    assert!(unit.mru_buffers().is_empty());
    assert_eq!(unit.victim(), 0);
}

/// Invalid buffers never report hits, even on the zero block their slots hold.
#[test]
fn invalid_buffer_never_hits() {
    let unit = StreamBufferArray::new(1, 2);
    assert!(!unit.contains(BlockId(0)));
    assert!(unit.buffer(0).position(BlockId(0)).is_none());
}

#[test]
fn fill_holds_blocks_after_start() {
    let mut unit = StreamBufferArray::new(2, 4);
    assert_eq!(unit.fill(0, BlockId(10), 4), 4);
    assert_eq!(entries(&unit, 0), vec![11, 12, 13, 14]);
    assert!(unit.buffer(0).is_valid());
    assert!(unit.contains(BlockId(13)));
    assert!(!unit.contains(BlockId(10)));
    assert_eq!(unit.buffer(0).position(BlockId(12)), Some(1));
}

#[test]
fn transfer_shifts_and_refills_tail() {
    let mut unit = StreamBufferArray::new(1, 4);
    let _ = unit.fill(0, BlockId(0), 4);
    assert_eq!(unit.transfer(BlockId(3)), 3);
    assert_eq!(entries(&unit, 0), vec![4, 5, 6, 7]);
}

#[test]
fn transfer_of_head_fetches_one() {
    let mut unit = StreamBufferArray::new(1, 4);
    let _ = unit.fill(0, BlockId(0), 4);
    assert_eq!(unit.transfer(BlockId(1)), 1);
    assert_eq!(entries(&unit, 0), vec![2, 3, 4, 5]);
}

#[test]
fn transfer_of_tail_replaces_everything() {
    let mut unit = StreamBufferArray::new(1, 4);
    let _ = unit.fill(0, BlockId(0), 4);
    assert_eq!(unit.transfer(BlockId(4)), 4);
    assert_eq!(entries(&unit, 0), vec![5, 6, 7, 8]);
}

#[test]
fn transfer_of_unknown_block_is_noop() {
    let mut unit = StreamBufferArray::new(1, 2);
    let _ = unit.fill(0, BlockId(0), 2);
    assert_eq!(unit.transfer(BlockId(9)), 0);
    assert_eq!(entries(&unit, 0), vec![1, 2]);
}

/// Overlapping streams: the most recently used holder of the block is advanced.
#[test]
fn transfer_prefers_mru_holder() {
    let mut unit = StreamBufferArray::new(2, 2);
    let _ = unit.fill(0, BlockId(0), 2);
    let _ = unit.fill(1, BlockId(1), 2);
    assert_eq!(unit.transfer(BlockId(2)), 1);
    assert_eq!(entries(&unit, 1), vec![3, 4]);
    assert_eq!(entries(&unit, 0), vec![1, 2]);
    assert_eq!(unit.mru(), Some(1));
    assert_eq!(unit.victim(), 0);
}

#[test]
fn victim_prefers_invalid_then_lru() {
    let mut unit = StreamBufferArray::new(3, 2);
    let _ = unit.fill(0, BlockId(0), 2);
    assert_eq!(unit.victim(), 1);
    let _ = unit.fill(1, BlockId(10), 2);
    let _ = unit.fill(2, BlockId(20), 2);
    assert_eq!(unit.victim(), 0);

    // Advancing buffer 0 makes buffer 1 the oldest.
    let _ = unit.transfer(BlockId(1));
    assert_eq!(unit.victim(), 1);
}

#[test]
fn mru_buffers_ordered_by_recency() {
    let mut unit = StreamBufferArray::new(3, 1);
    let _ = unit.fill(2, BlockId(0), 1);
    let _ = unit.fill(0, BlockId(10), 1);
    let order: Vec<u32> = unit
        .mru_buffers()
        .iter()
        .map(|b| b.entries()[0].val())
        .collect();
    assert_eq!(order, vec![11, 1]);
    assert_eq!(unit.mru(), Some(0));
}
