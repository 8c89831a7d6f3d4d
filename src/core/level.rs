//! The cache-level state machine: geometry, storage, and write policy.
//!
//! `CacheLevel` owns its own sets, replacement policy, and counters, but
//! never calls into its neighbours directly — the recursive traversal
//! along `load_from`/`store_to`/`victims_to` is performed by
//! [`crate::sim::graph::Graph`], which holds the arena all nodes live
//! in. This keeps every edge a plain [`NodeId`] rather than an owning
//! reference, per the no-cycles design note.

use crate::common::addr::AddressCodec;
use crate::core::counters::Counters;
use crate::core::line::CacheLine;
use crate::core::policies::{AnyPolicy, ReplacementPolicy};
use crate::core::set::CacheSet;
use crate::core::NodeId;

/// The write-back/write-allocate/write-combining combination governing
/// a level's store behaviour. Exactly the four triples named in §3 are
/// representable; invalid combinations cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Stores pass through immediately; never allocates on a store miss.
    WriteThrough,
    /// Stores are buffered until eviction; a store miss refills the
    /// line first.
    WriteBackAllocate,
    /// Stores are buffered until eviction; a store miss does not refill
    /// and instead passes through to `store_to`.
    WriteBackNoAllocate,
    /// Like `WriteBackNoAllocate`, but this level itself acts as the
    /// combining buffer: partial stores accumulate per-subblock dirt
    /// and are flushed as one combined store on eviction.
    WriteCombining {
        /// Subblock size in bytes; must divide `cl_size`.
        subblock_size: usize,
    },
}

impl WritePolicy {
    /// Whether dirty lines are retained rather than immediately flushed.
    #[must_use]
    pub fn is_write_back(self) -> bool {
        !matches!(self, Self::WriteThrough)
    }

    /// Whether a store miss triggers a refill of the missing line.
    #[must_use]
    pub fn is_write_allocate(self) -> bool {
        matches!(self, Self::WriteBackAllocate)
    }

    /// Whether this level combines partial stores at subblock
    /// granularity.
    #[must_use]
    pub fn is_combining(self) -> bool {
        matches!(self, Self::WriteCombining { .. })
    }

    /// The subblock size, if this is a combining policy.
    #[must_use]
    pub fn subblock_size(self) -> Option<usize> {
        match self {
            Self::WriteCombining { subblock_size } => Some(subblock_size),
            _ => None,
        }
    }
}

/// Local state of one cache node: geometry, storage, replacement
/// ordering, write policy, edges, and counters.
#[derive(Debug, Clone)]
pub struct CacheLevel {
    name: String,
    codec: AddressCodec,
    sets: Vec<CacheSet>,
    policy: AnyPolicy,
    write_policy: WritePolicy,
    swap_on_load: bool,
    load_from: Option<NodeId>,
    store_to: Option<NodeId>,
    victims_to: Option<NodeId>,
    counters: Counters,
}

impl CacheLevel {
    /// Creates a level with `sets` sets of `ways` ways each, `cl_size`
    /// bytes per line, the given replacement and write policies, and
    /// the (already-resolved) neighbour edges.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        sets: usize,
        ways: usize,
        cl_size: usize,
        policy: AnyPolicy,
        write_policy: WritePolicy,
        swap_on_load: bool,
        load_from: Option<NodeId>,
        store_to: Option<NodeId>,
        victims_to: Option<NodeId>,
    ) -> Self {
        Self {
            name: name.into(),
            codec: AddressCodec::new(cl_size, sets),
            sets: (0..sets).map(|_| CacheSet::new(ways)).collect(),
            policy,
            write_policy,
            swap_on_load,
            load_from,
            store_to,
            victims_to,
            counters: Counters::new(),
        }
    }

    /// This level's name, as given in the graph description.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The address codec for this level's geometry.
    #[must_use]
    pub fn codec(&self) -> &AddressCodec {
        &self.codec
    }

    /// Number of sets.
    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Associativity (ways per set).
    #[must_use]
    pub fn ways(&self) -> usize {
        self.sets.first().map_or(0, CacheSet::ways)
    }

    /// The write policy governing store behaviour at this level.
    #[must_use]
    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Whether a swap-to-front reordering happens on a load hit, in
    /// addition to the policy's own ordering update.
    #[must_use]
    pub fn swap_on_load(&self) -> bool {
        self.swap_on_load
    }

    /// The node a miss forwards a refill request to, if any.
    #[must_use]
    pub fn load_from(&self) -> Option<NodeId> {
        self.load_from
    }

    /// The node a dirty eviction writes back to, if any.
    #[must_use]
    pub fn store_to(&self) -> Option<NodeId> {
        self.store_to
    }

    /// The node any eviction (dirty or clean) is also forwarded to, if
    /// this level has a victim cache.
    #[must_use]
    pub fn victims_to(&self) -> Option<NodeId> {
        self.victims_to
    }

    /// This level's counters.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Mutable access to this level's counters.
    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    /// The set at `index`.
    #[must_use]
    pub fn set(&self, index: usize) -> &CacheSet {
        &self.sets[index]
    }

    /// Mutable access to the set at `index`.
    pub fn set_mut(&mut self, index: usize) -> &mut CacheSet {
        &mut self.sets[index]
    }

    /// Looks up `line`, returning `(set_index, way)` on a hit.
    #[must_use]
    pub fn lookup(&self, line: u64) -> Option<(usize, usize)> {
        let set_idx = self.codec.set_of(line);
        self.sets[set_idx].find(line).map(|way| (set_idx, way))
    }

    /// Updates replacement ordering for a hit or post-install touch.
    pub fn touch(&mut self, set_idx: usize, way: usize) {
        self.policy.update(set_idx, way);
    }

    /// Installs `line` into `set_idx`, choosing the lowest free way if
    /// one exists, otherwise evicting the policy's victim (lowest way
    /// index breaking any tie). Returns the evicted entry, if the set
    /// was full.
    pub fn install(&mut self, set_idx: usize, line: u64) -> (usize, Option<CacheLine>) {
        let set = &mut self.sets[set_idx];
        if let Some(way) = set.find_free() {
            set.install(way, line);
            self.policy.update(set_idx, way);
            return (way, None);
        }
        let way = self.policy.get_victim(set_idx);
        let evicted = *set.get(way);
        set.install(way, line);
        self.policy.update(set_idx, way);
        (way, Some(evicted))
    }

    /// Marks the dirty bits at `(set_idx, way)` for a whole-line
    /// write-back store.
    pub fn mark_dirty_whole(&mut self, set_idx: usize, way: usize) {
        self.sets[set_idx].get_mut(way).mark_dirty_whole();
    }

    /// Marks the subblocks in `mask` dirty at `(set_idx, way)`.
    pub fn mark_dirty_subblocks(&mut self, set_idx: usize, way: usize, mask: u64) {
        self.sets[set_idx].get_mut(way).mark_dirty_subblocks(mask);
    }

    /// Invalidates every set, discarding residency and dirty state.
    pub fn mark_all_invalid(&mut self) {
        for set in &mut self.sets {
            set.invalidate_all();
        }
    }

    /// Zeroes this level's counters.
    pub fn reset_stats(&mut self) {
        self.counters.reset();
    }

    /// Every dirty valid entry across all sets, as `(set_idx, way,
    /// entry)` triples, used by a global `force_write_back` sweep.
    #[must_use]
    pub fn dirty_entries(&self) -> Vec<(usize, usize, CacheLine)> {
        let mut out = Vec::new();
        for (set_idx, set) in self.sets.iter().enumerate() {
            for (way, entry) in set.occupied() {
                if entry.is_dirty() {
                    out.push((set_idx, way, *entry));
                }
            }
        }
        out
    }

    /// Clears the dirty bit at `(set_idx, way)` without invalidating it.
    pub fn clear_dirty(&mut self, set_idx: usize, way: usize) {
        self.sets[set_idx].get_mut(way).clear_dirty();
    }

    /// Total resident lines across all sets.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.sets.iter().map(CacheSet::occupancy).sum()
    }

    /// Every resident line index, for the visualisation query.
    #[must_use]
    pub fn resident_lines(&self) -> Vec<u64> {
        self.sets
            .iter()
            .flat_map(|set| set.occupied().map(|(_, entry)| entry.line))
            .collect()
    }
}
