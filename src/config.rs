//! Graph description types for the cache hierarchy.
//!
//! This module defines the `serde`-deserializable shape of a cache graph
//! (§6 External Interfaces): a mapping from cache name to geometry, write
//! policy, and edge names. It intentionally stops at the data model — no
//! file I/O, no CLI flags. [`crate::sim::Simulator::from_description`] is
//! where a `GraphDescription` becomes a validated, running graph. Reading
//! the JSON off disk or a `--config` flag is a driver concern, not this
//! crate's (§1).

use std::collections::BTreeMap;

use serde::Deserialize;

/// Default values used when a field is omitted from the description.
///
/// A `BTreeMap` (rather than the faster but iteration-order-randomized
/// `HashMap`) is used for [`GraphDescription`] so that node construction
/// order — and therefore `NodeId` assignment — is a deterministic
/// function of cache name, not of hash-seed or insertion order.
mod defaults {
    /// Default replacement policy when omitted.
    pub const REPLACEMENT_POLICY: super::ReplacementPolicyKind =
        super::ReplacementPolicyKind::Lru;
    /// Default `write_back` flag (write-back, write-allocate is the most
    /// common cache configuration).
    pub const WRITE_BACK: bool = true;
    /// Default `write_allocate` flag.
    pub const WRITE_ALLOCATE: bool = true;
    /// Default `write_combining` flag.
    pub const WRITE_COMBINING: bool = false;
    /// Default `swap_on_load` flag.
    pub const SWAP_ON_LOAD: bool = false;
}

/// Cache replacement policy, as named in a graph description.
///
/// Serialized/deserialized in upper case (`"FIFO"`, `"LRU"`, `"MRU"`,
/// `"RR"`), matching the vocabulary used throughout §3/§4 of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicyKind {
    /// First-In, First-Out.
    Fifo,
    /// Least Recently Used.
    Lru,
    /// Most Recently Used.
    Mru,
    /// Round-robin / random victim selection, seeded for determinism.
    Rr,
}

impl Default for ReplacementPolicyKind {
    fn default() -> Self {
        defaults::REPLACEMENT_POLICY
    }
}

/// One cache node's geometry, write policy, and edges, as named in a
/// [`GraphDescription`].
///
/// # Examples
///
/// Deserializing a single node from JSON:
///
/// ```
/// use cachesim_core::config::CacheNodeDescription;
///
/// let json = r#"{
///     "sets": 64, "ways": 8, "cl_size": 64,
///     "replacement_policy": "LRU",
///     "load_from": "L2"
/// }"#;
/// let node: CacheNodeDescription = serde_json::from_str(json).unwrap();
/// assert_eq!(node.sets, 64);
/// assert_eq!(node.load_from.as_deref(), Some("L2"));
/// assert!(node.write_back, "write_back defaults to true");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CacheNodeDescription {
    /// Number of sets.
    pub sets: usize,
    /// Associativity (ways per set).
    pub ways: usize,
    /// Cache line size in bytes; must be a power of two.
    pub cl_size: usize,

    /// Replacement policy for victim selection.
    #[serde(default)]
    pub replacement_policy: ReplacementPolicyKind,

    /// Whether evicted dirty lines are written back (vs. discarded).
    #[serde(default = "CacheNodeDescription::default_write_back")]
    pub write_back: bool,
    /// Whether a store miss triggers a refill of the missed line.
    #[serde(default = "CacheNodeDescription::default_write_allocate")]
    pub write_allocate: bool,
    /// Whether store misses are buffered into subblock-dirty lines
    /// instead of passing through or allocating.
    #[serde(default = "CacheNodeDescription::default_write_combining")]
    pub write_combining: bool,
    /// Subblock size in bytes for write-combining; required when
    /// `write_combining` is true, must divide `cl_size`.
    #[serde(default)]
    pub subblock_size: Option<usize>,

    /// Whether hit lines are promoted/swapped on load (kept for forward
    /// compatibility with source hierarchies that model swap-based
    /// promotion; the core's replacement policies already reorder on
    /// touch, so this is advisory metadata rather than behavior the
    /// engine branches on).
    #[serde(default = "CacheNodeDescription::default_swap_on_load")]
    pub swap_on_load: bool,

    /// Name of the cache (or memory) that misses are forwarded to.
    #[serde(default)]
    pub load_from: Option<String>,
    /// Name of the cache (or memory) that dirty write-backs are sent to.
    #[serde(default)]
    pub store_to: Option<String>,
    /// Name of the victim cache that evicted lines (clean or dirty) are
    /// inserted into.
    #[serde(default)]
    pub victims_to: Option<String>,
}

impl CacheNodeDescription {
    fn default_write_back() -> bool {
        defaults::WRITE_BACK
    }

    fn default_write_allocate() -> bool {
        defaults::WRITE_ALLOCATE
    }

    fn default_write_combining() -> bool {
        defaults::WRITE_COMBINING
    }

    fn default_swap_on_load() -> bool {
        defaults::SWAP_ON_LOAD
    }
}

/// A complete cache graph, as named cache nodes keyed by name.
///
/// Reserved name `"MEM"` (case-insensitive) may be used as an edge
/// target to refer to main memory explicitly; any edge left unresolved
/// after construction is wired to memory implicitly (§2: "the last node
/// along every load/store/victim chain points at main memory").
pub type GraphDescription = BTreeMap<String, CacheNodeDescription>;

/// The reserved name for main memory when referenced explicitly in an
/// edge (case-insensitive).
pub const MEMORY_NODE_NAME: &str = "MEM";
