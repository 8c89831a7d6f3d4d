//! Least Recently Used (LRU) replacement policy.
//!
//! Maintains a per-set usage stack; index 0 is the most-recently-used
//! way, the last index is the victim.

use super::ReplacementPolicy;

/// LRU policy state: one usage stack per set.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates an LRU policy for `sets` sets of `ways` ways each.
    #[must_use]
    pub fn new(sets: usize, ways: usize) -> Self {
        let usage = (0..sets).map(|_| (0..ways).collect()).collect();
        Self { usage }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            stack.remove(pos);
        }
        stack.insert(0, way);
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.usage[set]
            .last()
            .copied()
            .unwrap_or_else(|| unreachable!("a cache set always has at least one way"))
    }
}
