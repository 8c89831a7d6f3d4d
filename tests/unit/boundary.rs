//! Boundary behaviour of the request-trace surface (§8): alignment,
//! line-crossing, zero-length requests, and reset semantics.

use cachesim_core::sim::Simulator;

use crate::common::{node, stat_for};

fn single_level(sets: usize, ways: usize, cl_size: usize) -> std::collections::BTreeMap<String, cachesim_core::CacheNodeDescription> {
    let mut desc = std::collections::BTreeMap::new();
    desc.insert("L1".to_string(), node(sets, ways, cl_size));
    desc
}

/// A line-aligned request of exactly `cl_size` bytes emits one primitive
/// for the single line it covers.
#[test]
fn line_aligned_request_touches_exactly_one_line() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    sim.load(&0u64, 64);
    let stats = sim.stats();
    let l1 = stat_for(&stats, "L1");
    assert_eq!(l1.load_count, 1);
    assert_eq!(l1.load_byte, 64);
}

/// A request starting mid-line and crossing into the next line splits
/// into two segments whose byte counts sum to the request length.
#[test]
fn unaligned_request_splits_across_two_lines() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    sim.load(&60u64, 8);
    let stats = sim.stats();
    let l1 = stat_for(&stats, "L1");
    assert_eq!(l1.load_count, 2, "one segment per line crossed");
    assert_eq!(l1.load_byte, 8, "segment byte counts sum to the request length");
}

/// A request spanning many lines emits one segment per line crossed,
/// with the first and last segments clipped to the request's bounds.
#[test]
fn multi_line_request_emits_one_segment_per_line() {
    let mut sim = Simulator::from_description(&single_level(8, 2, 64)).unwrap();
    sim.load(&60u64, 200);
    let stats = sim.stats();
    let l1 = stat_for(&stats, "L1");
    // lines: [60,64)=4B, [64,128)=64B, [128,192)=64B, [192,256)=64B, [256,260)=4B
    assert_eq!(l1.load_count, 5);
    assert_eq!(l1.load_byte, 200);
}

/// A zero-length load is a no-op on every counter (§8).
#[test]
fn zero_length_load_touches_no_counters() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    sim.load(&0u64, 0);
    for level in sim.stats() {
        assert_eq!(level.load_count, 0);
        assert_eq!(level.load_byte, 0);
    }
}

/// A zero-length store is equally a no-op, and never errors even when
/// `non_temporal` would otherwise be rejected — the no-op check runs
/// before the non-temporal check.
#[test]
fn zero_length_store_is_a_no_op_regardless_of_non_temporal() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    assert!(sim.store(&0u64, 0, false).is_ok());
    for level in sim.stats() {
        assert_eq!(level.store_count, 0);
    }
}

/// An empty iterable address sequence is a no-op, same as a zero length.
#[test]
fn empty_iterable_trace_is_a_no_op() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    let addrs: Vec<u64> = Vec::new();
    sim.load(&addrs, 64);
    assert_eq!(sim.stats()[0].load_count, 0);
}

/// `reset_stats` zeroes every counter but does not disturb residency: a
/// line already resident before the reset is still a hit afterwards.
#[test]
fn reset_stats_does_not_evict_resident_lines() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    sim.load(&0u64, 64);
    sim.reset_stats();

    let stats = sim.stats();
    let l1 = stat_for(&stats, "L1");
    assert_eq!(l1.load_count, 0, "reset zeroes counters immediately");
    assert!(!sim.graph().cached("L1").is_empty(), "residency survives a stats reset");

    sim.load(&0u64, 64);
    let after = sim.stats();
    let l1_after = stat_for(&after, "L1");
    assert_eq!(l1_after.hit_count, 1, "the previously loaded line is still a hit");
}

/// `mark_all_invalid` does disturb residency: a subsequent load of the
/// same address is a miss again.
#[test]
fn mark_all_invalid_clears_residency() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    sim.load(&0u64, 64);
    sim.mark_all_invalid();
    assert!(sim.graph().cached("L1").is_empty());

    sim.reset_stats();
    sim.load(&0u64, 64);
    let stats = sim.stats();
    let l1 = stat_for(&stats, "L1");
    assert_eq!(l1.miss_count, 1, "invalidated residency makes the reload a miss");
}

/// `loadstore` interleaves a load before each store, in pair order.
#[test]
fn loadstore_runs_load_before_store_for_each_pair() {
    let mut sim = Simulator::from_description(&single_level(4, 2, 64)).unwrap();
    sim.loadstore(&[(0, 64), (128, 192)], 64).unwrap();
    let stats = sim.stats();
    let l1 = stat_for(&stats, "L1");
    assert_eq!(l1.load_count, 2);
    assert_eq!(l1.store_count, 2);
}
