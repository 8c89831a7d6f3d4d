//! The user-facing simulator surface: builds a [`Graph`] from a
//! description and fans out load/store requests to the first level.
//!
//! Per the design note on iterable inputs (§9), a single internal path
//! consumes an [`AddressSeq`] and treats a scalar address as a
//! one-element sequence — there is no runtime "expected an iterable"
//! fault to raise, because the type system already rules it out.

pub mod graph;
pub mod stats;

pub use graph::Graph;
pub use stats::LevelStats;

use crate::common::error::{ConfigError, RequestError};
use crate::config::GraphDescription;

/// A finite sequence of byte addresses, uniformly covering both a
/// single scalar address and an iterable trace of addresses (§9).
pub trait AddressSeq {
    /// Iterates the addresses in this sequence, in order.
    fn addresses(&self) -> impl Iterator<Item = u64> + '_;
}

impl AddressSeq for u64 {
    fn addresses(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(*self)
    }
}

impl AddressSeq for [u64] {
    fn addresses(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().copied()
    }
}

impl AddressSeq for Vec<u64> {
    fn addresses(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().copied()
    }
}

/// Owns the built cache graph and provides the request-trace API of
/// §4.5: scalar and iterable `load`/`store`, `loadstore`, traversal,
/// statistics, and the global reset/flush operations.
#[derive(Debug, Clone)]
pub struct Simulator {
    graph: Graph,
}

impl Simulator {
    /// Builds a simulator from a graph description (§4.5, §6, §7).
    ///
    /// # Errors
    ///
    /// See [`Graph::from_description`].
    pub fn from_description(description: &GraphDescription) -> Result<Self, ConfigError> {
        Ok(Self {
            graph: Graph::from_description(description)?,
        })
    }

    /// Direct access to the underlying graph, for traversal and
    /// statistics queries that do not need the request-trace wrapper.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Loads `length` bytes starting at each address in `addrs`, in
    /// order. A zero `length` or an empty sequence is a no-op (§8).
    pub fn load(&mut self, addrs: &impl AddressSeq, length: usize) {
        if length == 0 {
            return;
        }
        for addr in addrs.addresses() {
            for (line, bytes, _seg_addr) in self.graph.first_level_codec().segments(addr, length) {
                self.graph.load_line_at_first_level(line, bytes as u64);
            }
        }
    }

    /// Stores `length` bytes starting at each address in `addrs`, in
    /// order. `non_temporal` must be `false` — non-temporal stores are
    /// out of scope (§1).
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NonTemporalUnsupported`] if
    /// `non_temporal` is `true`; no counters are touched.
    pub fn store(
        &mut self,
        addrs: &impl AddressSeq,
        length: usize,
        non_temporal: bool,
    ) -> Result<(), RequestError> {
        if non_temporal {
            return Err(RequestError::NonTemporalUnsupported);
        }
        if length == 0 {
            return Ok(());
        }
        for addr in addrs.addresses() {
            let segments: Vec<_> = self.graph.first_level_codec().segments(addr, length);
            for (line, bytes, seg_addr) in segments {
                self.graph
                    .store_line_at_first_level(line, bytes as u64, seg_addr);
            }
        }
        Ok(())
    }

    /// Interleaves loads before stores of each `(loads, stores)` pair,
    /// emulating a read-modify-write (§4.3 iterator forms).
    ///
    /// # Errors
    ///
    /// See [`Simulator::store`].
    pub fn loadstore(
        &mut self,
        pairs: &[(u64, u64)],
        length: usize,
    ) -> Result<(), RequestError> {
        for &(load_addr, store_addr) in pairs {
            self.load(&load_addr, length);
            self.store(&store_addr, length, false)?;
        }
        Ok(())
    }

    /// Every reachable cache's name, in traversal order, memory last if
    /// `with_memory` (§5).
    #[must_use]
    pub fn levels(&self, with_memory: bool) -> Vec<String> {
        self.graph.levels(with_memory)
    }

    /// A statistics snapshot, memory last.
    #[must_use]
    pub fn stats(&self) -> Vec<LevelStats> {
        self.graph.stats()
    }

    /// Renders [`Simulator::stats`] as the pretty-print table (§6).
    #[must_use]
    pub fn print_stats(&self, header: Option<&str>) -> String {
        self.graph.print_stats(header)
    }

    /// Zeroes every counter in the hierarchy.
    pub fn reset_stats(&mut self) {
        self.graph.reset_stats();
    }

    /// Invalidates every cache's residency.
    pub fn mark_all_invalid(&mut self) {
        self.graph.mark_all_invalid();
    }

    /// Flushes every dirty line in the hierarchy via the same `evict`
    /// path a real eviction would take (victim edge first, then
    /// write-back neighbour), outermost level first.
    pub fn force_write_back(&mut self) {
        self.graph.force_write_back();
    }
}
