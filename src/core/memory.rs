//! The main-memory sink node.
//!
//! Memory never misses and has no associativity of its own; its
//! counters are a derived view of the traffic that reaches it, per
//! §4.4. Rather than deriving them after the fact from the surrounding
//! levels, the graph simply recurses into this node like any other —
//! `record_load` and `record_store` are called exactly when traffic
//! truly reaches memory, which reproduces the derived formula without
//! special-casing victim caches that sit between the last level and
//! memory.

use crate::core::counters::Counters;

/// A passive terminus absorbing whatever traffic reaches it.
#[derive(Debug, Clone, Default)]
pub struct MainMemory {
    counters: Counters,
}

impl MainMemory {
    /// A fresh, empty memory node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// This node's counters.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Records a load of `bytes` reaching memory. Memory never misses,
    /// so every load it sees is simultaneously a hit.
    pub fn record_load(&mut self, bytes: u64) {
        self.counters.load_count += 1;
        self.counters.load_byte += bytes;
        self.counters.hit_count += 1;
        self.counters.hit_byte += bytes;
    }

    /// Records a store of `bytes` reaching memory (a write-back or a
    /// write-through pass-through that terminated here).
    pub fn record_store(&mut self, bytes: u64) {
        self.counters.store_count += 1;
        self.counters.store_byte += bytes;
    }

    /// Zeroes memory's counters.
    pub fn reset_stats(&mut self) {
        self.counters.reset();
    }
}
