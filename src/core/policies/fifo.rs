//! First-In, First-Out (FIFO) replacement policy.
//!
//! Evicts the oldest cache line in a set regardless of access recency.
//! Operates as a circular pointer per set; the pointer advances only
//! when the way it currently names is (re-)installed.

use super::ReplacementPolicy;

/// FIFO policy state: one eviction pointer per set.
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    next_way: Vec<usize>,
    ways: usize,
}

impl FifoPolicy {
    /// Creates a FIFO policy for `sets` sets of `ways` ways each.
    #[must_use]
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn update(&mut self, set: usize, way: usize) {
        if self.next_way[set] == way {
            self.next_way[set] = (self.next_way[set] + 1) % self.ways;
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.next_way[set]
    }
}
