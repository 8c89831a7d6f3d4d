//! The cache graph: builds nodes from a description and performs the
//! recursive traversal that implements the engine's primitives.
//!
//! `Graph` is the arena every [`NodeId`] indexes into. `CacheLevel` and
//! `MainMemory` (in [`crate::core`]) hold only local state; all
//! recursion along `load_from`/`store_to`/`victims_to` happens here,
//! one `NodeId` hop at a time, so no node ever borrows another.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::common::error::ConfigError;
use crate::config::{CacheNodeDescription, GraphDescription, ReplacementPolicyKind, MEMORY_NODE_NAME};
use crate::core::level::{CacheLevel, WritePolicy};
use crate::core::line::CacheLine;
use crate::core::memory::MainMemory;
use crate::core::policies::{AnyPolicy, FifoPolicy, LruPolicy, MruPolicy, RrPolicy};
use crate::core::NodeId;
use crate::sim::stats::LevelStats;

/// One node in the arena: a cache level or the memory sink.
#[derive(Debug, Clone)]
enum Node {
    Cache(CacheLevel),
    Memory(MainMemory),
}

/// The built, validated cache hierarchy.
///
/// Construct with [`Graph::from_description`]; once built, the set of
/// nodes and edges is immutable — only their counters and residency
/// change as requests are served.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    first_level: NodeId,
    memory: NodeId,
}

/// Which of a node's three edges is being resolved, for error messages.
#[derive(Debug, Clone, Copy)]
enum EdgeKind {
    LoadFrom,
    StoreTo,
    VictimsTo,
}

impl EdgeKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::LoadFrom => "load_from",
            Self::StoreTo => "store_to",
            Self::VictimsTo => "victims_to",
        }
    }
}

impl Graph {
    /// Builds a validated graph from a named mapping of cache
    /// descriptions (§4.5, §6, §7).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for any of the faults named in §7:
    /// non-power-of-two geometry, non-monotone line sizes, an invalid
    /// write-policy triple, a dangling edge, an ambiguous or missing
    /// first level, or a cycle.
    pub fn from_description(description: &GraphDescription) -> Result<Self, ConfigError> {
        if description.is_empty() {
            return Err(ConfigError::EmptyGraph);
        }

        let names: Vec<&str> = description.keys().map(String::as_str).collect();
        let name_to_id: std::collections::BTreeMap<&str, NodeId> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, NodeId::new(i)))
            .collect();
        let memory = NodeId::new(names.len());

        let resolve = |name: &str,
                       kind: EdgeKind,
                       target: Option<&str>,
                       terminate_at_memory: bool|
         -> Result<Option<NodeId>, ConfigError> {
            match target {
                None => Ok(if terminate_at_memory { Some(memory) } else { None }),
                Some(t) if t.eq_ignore_ascii_case(MEMORY_NODE_NAME) => Ok(Some(memory)),
                Some(t) => name_to_id.get(t).copied().map(Some).ok_or_else(|| {
                    ConfigError::UnknownEdgeTarget {
                        name: name.to_string(),
                        edge: kind.as_str(),
                        target: t.to_string(),
                    }
                }),
            }
        };

        let mut edges: Vec<(Option<NodeId>, Option<NodeId>, Option<NodeId>)> =
            Vec::with_capacity(names.len());
        for name in &names {
            let desc = &description[*name];
            let load_from = resolve(
                name,
                EdgeKind::LoadFrom,
                desc.load_from.as_deref(),
                true,
            )?;
            let store_to = resolve(name, EdgeKind::StoreTo, desc.store_to.as_deref(), true)?;
            let victims_to = resolve(
                name,
                EdgeKind::VictimsTo,
                desc.victims_to.as_deref(),
                false,
            )?;
            edges.push((load_from, store_to, victims_to));
        }

        for (i, name) in names.iter().enumerate() {
            let desc = &description[*name];
            validate_geometry(name, desc)?;
            build_write_policy(name, desc)?;
            let (load_from, store_to, victims_to) = edges[i];
            validate_line_size_monotonicity(name, desc, "load_from", load_from, memory, &names, description)?;
            validate_line_size_monotonicity(name, desc, "store_to", store_to, memory, &names, description)?;
            if let Some(victim) = victims_to {
                if victim != memory {
                    let victim_name = names[victim.index()];
                    let victim_desc = &description[victim_name];
                    if victim_desc.cl_size != desc.cl_size {
                        return Err(ConfigError::VictimLineSizeMismatch {
                            name: name.to_string(),
                            cl_size: desc.cl_size,
                            victim: victim_name.to_string(),
                            victim_cl_size: victim_desc.cl_size,
                        });
                    }
                }
            }
        }

        let mut referenced: HashSet<NodeId> = HashSet::new();
        for (load_from, store_to, victims_to) in &edges {
            for target in [*load_from, *store_to, *victims_to] {
                if let Some(target) = target {
                    if target != memory {
                        referenced.insert(target);
                    }
                }
            }
        }
        let candidates: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| !referenced.contains(&NodeId::new(*i)))
            .map(|(_, name)| *name)
            .collect();
        if candidates.len() != 1 {
            return Err(ConfigError::AmbiguousFirstLevel {
                count: candidates.len(),
                candidates: candidates.into_iter().map(str::to_string).collect(),
            });
        }
        let first_level = name_to_id[candidates[0]];

        detect_cycle(&names, &edges, memory)?;

        let mut nodes = Vec::with_capacity(names.len() + 1);
        for (i, name) in names.iter().enumerate() {
            let desc = &description[*name];
            let (load_from, store_to, victims_to) = edges[i];
            let policy = build_policy(desc.replacement_policy, desc.sets, desc.ways, i);
            let write_policy = build_write_policy(name, desc)?;
            nodes.push(Node::Cache(CacheLevel::new(
                (*name).to_string(),
                desc.sets,
                desc.ways,
                desc.cl_size,
                policy,
                write_policy,
                desc.swap_on_load,
                load_from,
                store_to,
                victims_to,
            )));
        }
        nodes.push(Node::Memory(MainMemory::new()));

        debug!(nodes = nodes.len(), first_level = %names[first_level.index()], "built cache graph");

        Ok(Self {
            nodes,
            first_level,
            memory,
        })
    }

    fn cache(&self, id: NodeId) -> &CacheLevel {
        match &self.nodes[id.index()] {
            Node::Cache(level) => level,
            Node::Memory(_) => unreachable!("memory node has no CacheLevel"),
        }
    }

    fn cache_mut(&mut self, id: NodeId) -> &mut CacheLevel {
        match &mut self.nodes[id.index()] {
            Node::Cache(level) => level,
            Node::Memory(_) => unreachable!("memory node has no CacheLevel"),
        }
    }

    fn memory_mut(&mut self) -> &mut MainMemory {
        match &mut self.nodes[self.memory.index()] {
            Node::Memory(mem) => mem,
            Node::Cache(_) => unreachable!("memory index must hold MainMemory"),
        }
    }

    fn memory_ref(&self) -> &MainMemory {
        match &self.nodes[self.memory.index()] {
            Node::Memory(mem) => mem,
            Node::Cache(_) => unreachable!("memory index must hold MainMemory"),
        }
    }

    /// The name of the first level (entry point for all external
    /// requests).
    #[must_use]
    pub fn first_level_name(&self) -> &str {
        self.cache(self.first_level).name()
    }

    /// Issues a whole line load at the first level.
    pub(crate) fn load_line_at_first_level(&mut self, line: u64, bytes: u64) {
        self.load_line(self.first_level, line, bytes);
    }

    /// Issues a store at the first level.
    pub(crate) fn store_line_at_first_level(&mut self, line: u64, bytes: u64, addr: u64) {
        self.store_line(self.first_level, line, bytes, addr);
    }

    /// The first level's address codec, used to split a user request
    /// into per-line segments before dispatch.
    pub(crate) fn first_level_codec(&self) -> &crate::common::addr::AddressCodec {
        self.cache(self.first_level).codec()
    }

    fn load_line(&mut self, node: NodeId, line: u64, bytes: u64) {
        if node == self.memory {
            self.memory_mut().record_load(bytes);
            return;
        }

        let level = self.cache(node);
        let set_idx = level.codec().set_of(line);
        let hit = level.lookup(line);

        let level = self.cache_mut(node);
        level.counters_mut().load_count += 1;
        level.counters_mut().load_byte += bytes;

        if let Some((_, way)) = hit {
            level.touch(set_idx, way);
            level.counters_mut().hit_count += 1;
            level.counters_mut().hit_byte += bytes;
            return;
        }

        level.counters_mut().miss_count += 1;
        level.counters_mut().miss_byte += bytes;
        let load_from = level.load_from();
        let cl_size = level.codec().cl_size() as u64;

        if let Some(next) = load_from {
            self.load_line(next, line, cl_size);
        }

        let level = self.cache_mut(node);
        let (_, evicted) = level.install(set_idx, line);
        if let Some(victim) = evicted {
            self.evict(node, victim);
        }
    }

    fn store_line(&mut self, node: NodeId, line: u64, bytes: u64, addr: u64) {
        if node == self.memory {
            self.memory_mut().record_store(bytes);
            return;
        }

        let level = self.cache(node);
        let set_idx = level.codec().set_of(line);
        let hit = level.lookup(line);
        let write_policy = level.write_policy();
        let load_from = level.load_from();
        let store_to = level.store_to();
        let cl_size = level.codec().cl_size() as u64;
        let subblock_size = write_policy.subblock_size();

        {
            let level = self.cache_mut(node);
            level.counters_mut().store_count += 1;
            level.counters_mut().store_byte += bytes;
        }

        if let Some((_, way)) = hit {
            {
                let level = self.cache_mut(node);
                level.touch(set_idx, way);
                if write_policy.is_write_back() {
                    if let Some(sb) = subblock_size {
                        let mask = level.codec().subblock_mask(addr, bytes as usize, sb);
                        level.mark_dirty_subblocks(set_idx, way, mask);
                    } else {
                        level.mark_dirty_whole(set_idx, way);
                    }
                }
            }
            if !write_policy.is_write_back() {
                if let Some(target) = store_to {
                    self.store_line(target, line, bytes, addr);
                }
            }
            return;
        }

        match write_policy {
            WritePolicy::WriteBackAllocate => {
                if let Some(from) = load_from {
                    self.load_line(from, line, cl_size);
                }
                let level = self.cache_mut(node);
                let (way, evicted) = level.install(set_idx, line);
                level.mark_dirty_whole(set_idx, way);
                if let Some(victim) = evicted {
                    self.evict(node, victim);
                }
            }
            WritePolicy::WriteCombining { subblock_size: sb } => {
                let level = self.cache_mut(node);
                let (way, evicted) = level.install(set_idx, line);
                let mask = level.codec().subblock_mask(addr, bytes as usize, sb);
                level.mark_dirty_subblocks(set_idx, way, mask);
                if let Some(victim) = evicted {
                    self.evict(node, victim);
                }
            }
            WritePolicy::WriteBackNoAllocate | WritePolicy::WriteThrough => {
                if let Some(target) = store_to {
                    self.store_line(target, line, bytes, addr);
                }
            }
        }
    }

    fn evict(&mut self, node: NodeId, entry: CacheLine) {
        let level = self.cache(node);
        let cl_size = level.codec().cl_size() as u64;
        let write_policy = level.write_policy();
        let victims_to = level.victims_to();
        let store_to = level.store_to();
        let line_addr = entry.line * cl_size;

        if let Some(victim_node) = victims_to {
            self.insert_victim(victim_node, entry);
            return;
        }

        if entry.is_dirty() && write_policy.is_write_back() {
            let dirty_bytes = if let Some(sb) = write_policy.subblock_size() {
                u64::from(entry.dirty_subblock_count()) * sb as u64
            } else {
                cl_size
            };
            if let Some(target) = store_to {
                self.store_line(target, entry.line, dirty_bytes, line_addr);
            }
            self.cache_mut(node).counters_mut().record_evict(dirty_bytes);
            return;
        }

        // Open question (a): clean evictions count as traffic at every
        // level except write-through, where they never entered the
        // cache as writes and are not counted.
        if !matches!(write_policy, WritePolicy::WriteThrough) {
            self.cache_mut(node).counters_mut().record_evict(cl_size);
        }
    }

    fn insert_victim(&mut self, node: NodeId, entry: CacheLine) {
        if node == self.memory {
            return;
        }
        let set_idx = self.cache(node).codec().set_of(entry.line);
        let level = self.cache_mut(node);
        let (way, evicted) = level.install(set_idx, entry.line);
        if entry.is_dirty() {
            level.mark_dirty_subblocks(set_idx, way, entry.dirty_mask);
        }
        if let Some(victim) = evicted {
            self.evict(node, victim);
        }
    }

    /// Traversal order of cache nodes only (never memory), breadth-first
    /// along `load_from`, with `victims_to` then `store_to` siblings
    /// yielded immediately after their parent (§5, §9 design note (b)).
    fn cache_node_order(&self) -> Vec<NodeId> {
        let mut emitted: HashSet<NodeId> = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        emitted.insert(self.first_level);
        order.push(self.first_level);
        queue.push_back(self.first_level);

        while let Some(id) = queue.pop_front() {
            let level = self.cache(id);
            for sibling in [level.victims_to(), level.store_to()] {
                if let Some(sib) = sibling {
                    if sib != self.memory && emitted.insert(sib) {
                        order.push(sib);
                        queue.push_back(sib);
                    }
                }
            }
            if let Some(next) = level.load_from() {
                if next != self.memory && emitted.insert(next) {
                    order.push(next);
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// Every reachable cache, in traversal order, with memory last if
    /// `with_memory` is set (§5, §9 design note (b)).
    #[must_use]
    pub fn levels(&self, with_memory: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .cache_node_order()
            .into_iter()
            .map(|id| self.cache(id).name().to_string())
            .collect();
        if with_memory {
            names.push(MEMORY_NODE_NAME.to_string());
        }
        names
    }

    /// A statistics snapshot for every reachable level, memory last.
    #[must_use]
    pub fn stats(&self) -> Vec<LevelStats> {
        let mut stats: Vec<LevelStats> = self
            .cache_node_order()
            .into_iter()
            .map(|id| LevelStats::new(self.cache(id).name(), self.cache(id).counters()))
            .collect();
        stats.push(LevelStats::new(MEMORY_NODE_NAME, self.memory_ref().counters()));
        stats
    }

    /// Renders [`Graph::stats`] as the pretty-print table from §6.
    #[must_use]
    pub fn print_stats(&self, header: Option<&str>) -> String {
        crate::sim::stats::render(&self.stats(), header)
    }

    /// Zeroes every level's and memory's counters.
    pub fn reset_stats(&mut self) {
        for node in self.cache_node_order() {
            self.cache_mut(node).reset_stats();
        }
        self.memory_mut().reset_stats();
    }

    /// Invalidates every cache's residency, independent of dirty state.
    pub fn mark_all_invalid(&mut self) {
        for node in self.cache_node_order() {
            self.cache_mut(node).mark_all_invalid();
        }
    }

    /// Flushes every dirty line in the hierarchy, outermost level
    /// first, so each level's write-back lands in an as-yet-unflushed
    /// neighbour (§3 Lifecycles).
    pub fn force_write_back(&mut self) {
        for node in self.cache_node_order() {
            let dirty = self.cache(node).dirty_entries();
            for (set_idx, way, entry) in dirty {
                self.evict(node, entry);
                self.cache_mut(node).clear_dirty(set_idx, way);
            }
        }
    }

    /// The set of byte addresses currently resident in the named level
    /// (or `"MEM"`, which is always empty — memory has no notion of
    /// residency), expanding each valid line to its `cl_size` addresses
    /// (§6 Visualisation feed).
    #[must_use]
    pub fn cached(&self, name: &str) -> BTreeSet<u64> {
        if name.eq_ignore_ascii_case(MEMORY_NODE_NAME) {
            return BTreeSet::new();
        }
        let Some(id) = self.find_by_name(name) else {
            return BTreeSet::new();
        };
        let level = self.cache(id);
        let cl_size = level.codec().cl_size() as u64;
        let mut set = BTreeSet::new();
        for line in level.resident_lines() {
            let start = line * cl_size;
            set.extend(start..start + cl_size);
        }
        set
    }

    fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.cache_node_order()
            .into_iter()
            .find(|id| self.cache(*id).name() == name)
    }
}

fn validate_geometry(name: &str, desc: &CacheNodeDescription) -> Result<(), ConfigError> {
    if !desc.cl_size.is_power_of_two() {
        return Err(ConfigError::LineSizeNotPowerOfTwo {
            name: name.to_string(),
            cl_size: desc.cl_size,
        });
    }
    if !desc.sets.is_power_of_two() {
        return Err(ConfigError::SetsNotPowerOfTwo {
            name: name.to_string(),
            sets: desc.sets,
        });
    }
    if desc.ways == 0 {
        return Err(ConfigError::ZeroWays {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn build_write_policy(name: &str, desc: &CacheNodeDescription) -> Result<WritePolicy, ConfigError> {
    let (wb, wa, wc) = (desc.write_back, desc.write_allocate, desc.write_combining);
    match (wb, wa, wc) {
        (false, false, false) => Ok(WritePolicy::WriteThrough),
        (true, true, false) => Ok(WritePolicy::WriteBackAllocate),
        (true, false, false) => Ok(WritePolicy::WriteBackNoAllocate),
        (true, false, true) => {
            let subblock_size = desc.subblock_size.ok_or_else(|| ConfigError::MissingSubblockSize {
                name: name.to_string(),
            })?;
            if subblock_size == 0 || desc.cl_size % subblock_size != 0 {
                return Err(ConfigError::SubblockSizeDoesNotDivide {
                    name: name.to_string(),
                    subblock_size,
                    cl_size: desc.cl_size,
                });
            }
            Ok(WritePolicy::WriteCombining { subblock_size })
        }
        _ => Err(ConfigError::InvalidWritePolicy {
            name: name.to_string(),
            write_back: wb,
            write_allocate: wa,
            write_combining: wc,
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_line_size_monotonicity(
    name: &str,
    desc: &CacheNodeDescription,
    edge: &'static str,
    target: Option<NodeId>,
    memory: NodeId,
    names: &[&str],
    description: &GraphDescription,
) -> Result<(), ConfigError> {
    let Some(target) = target else { return Ok(()) };
    if target == memory {
        return Ok(());
    }
    let neighbour_name = names[target.index()];
    let neighbour = &description[neighbour_name];
    if neighbour.cl_size < desc.cl_size {
        return Err(ConfigError::LineSizeNotMonotone {
            name: name.to_string(),
            cl_size: desc.cl_size,
            neighbour: neighbour_name.to_string(),
            neighbour_cl_size: neighbour.cl_size,
            edge,
        });
    }
    Ok(())
}

fn detect_cycle(
    names: &[&str],
    edges: &[(Option<NodeId>, Option<NodeId>, Option<NodeId>)],
    memory: NodeId,
) -> Result<(), ConfigError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Unvisited,
        Visiting,
        Done,
    }
    let mut state = vec![State::Unvisited; names.len()];

    fn visit(
        id: usize,
        edges: &[(Option<NodeId>, Option<NodeId>, Option<NodeId>)],
        memory: NodeId,
        state: &mut [State],
        names: &[&str],
    ) -> Result<(), ConfigError> {
        state[id] = State::Visiting;
        let (load_from, store_to, victims_to) = edges[id];
        for next in [load_from, store_to, victims_to].into_iter().flatten() {
            if next == memory {
                continue;
            }
            match state[next.index()] {
                State::Visiting => {
                    return Err(ConfigError::Cycle {
                        name: names[next.index()].to_string(),
                    })
                }
                State::Unvisited => visit(next.index(), edges, memory, state, names)?,
                State::Done => {}
            }
        }
        state[id] = State::Done;
        Ok(())
    }

    for id in 0..names.len() {
        if state[id] == State::Unvisited {
            visit(id, edges, memory, &mut state, names)?;
        }
    }
    Ok(())
}

fn build_policy(kind: ReplacementPolicyKind, sets: usize, ways: usize, node_index: usize) -> AnyPolicy {
    match kind {
        ReplacementPolicyKind::Fifo => AnyPolicy::Fifo(FifoPolicy::new(sets, ways)),
        ReplacementPolicyKind::Lru => AnyPolicy::Lru(LruPolicy::new(sets, ways)),
        ReplacementPolicyKind::Mru => AnyPolicy::Mru(MruPolicy::new(sets, ways)),
        ReplacementPolicyKind::Rr => {
            // No seed field exists in the graph description (§4.5); the
            // seed is instead derived from the node's position in the
            // (deterministically ordered, since GraphDescription is a
            // BTreeMap) description, so repeated builds of the same
            // description always produce the same RR sequence.
            let seed = crate::core::policies::rr::DEFAULT_SEED.wrapping_add(node_index as u64 + 1);
            AnyPolicy::Rr(RrPolicy::new(sets, ways, seed))
        }
    }
}
