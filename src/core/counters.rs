//! Per-level request counters.
//!
//! Every [`crate::core::level::CacheLevel`] and
//! [`crate::core::memory::MainMemory`] keeps one of these. Each counter
//! has a `_count` (number of requests) and a `_byte` (sum of request
//! lengths) dimension, matching the conservation invariant
//! `LOAD_count = HIT_count + MISS_count` (and the `_byte` analogue).

/// Load/store/hit/miss/evict counters, each tracked by request count and
/// by byte volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Number of load requests this level served.
    pub load_count: u64,
    /// Total bytes across all load requests.
    pub load_byte: u64,
    /// Number of store requests this level served.
    pub store_count: u64,
    /// Total bytes across all store requests.
    pub store_byte: u64,
    /// Number of requests satisfied by this level (hit).
    pub hit_count: u64,
    /// Total bytes of hit requests.
    pub hit_byte: u64,
    /// Number of requests this level had to forward further down.
    pub miss_count: u64,
    /// Total bytes of miss requests.
    pub miss_byte: u64,
    /// Number of lines evicted from this level.
    pub evict_count: u64,
    /// Total bytes evicted from this level.
    pub evict_byte: u64,
}

impl Counters {
    /// A zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records eviction of a line holding `bytes` bytes.
    pub fn record_evict(&mut self, bytes: u64) {
        self.evict_count += 1;
        self.evict_byte += bytes;
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether `LOAD = HIT + MISS` holds for both the count and byte
    /// dimensions (the conservation invariant from §8).
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.load_count == self.hit_count + self.miss_count
            && self.load_byte == self.hit_byte + self.miss_byte
    }
}
